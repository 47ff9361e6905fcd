//! Fixture HTTP server
//!
//! `scoreboard serve --board FILE` → serves the detail endpoint from the
//! board file's `details` map, so the TUI can be pointed at it without
//! the real chat server.

use std::net::SocketAddr;

use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};

use crate::error::{Error, Result};
use crate::model::{Board, BoardTarget};

#[derive(Serialize)]
struct BoardSummary<'a> {
    channel: &'a str,
    targets: &'a [BoardTarget],
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Routed response before it is written to the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Routed {
    fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        let body = serde_json::to_string(&ErrorBody {
            error: message.into(),
        })
        .unwrap_or_else(|_| "{}".to_string());
        Self::json(status, body)
    }
}

/// Map a request to a response. Pure, so routing is testable without
/// sockets.
pub fn route(board: &Board, method: &Method, url: &str) -> Routed {
    let path = url.split('?').next().unwrap_or("/");

    if *method != Method::Get {
        return Routed::error(405, "method not allowed");
    }

    if path == "/board" {
        let summary = BoardSummary {
            channel: &board.channel,
            targets: &board.targets,
        };
        return match serde_json::to_string(&summary) {
            Ok(json) => Routed::json(200, json),
            Err(e) => Routed::error(500, e.to_string()),
        };
    }

    let Some(rest) = path.strip_prefix("/targetdetailsjson/") else {
        return Routed::error(404, "not found");
    };

    let mut segments = rest.splitn(2, '/');
    let (Some(channel), Some(target)) = (segments.next(), segments.next()) else {
        return Routed::error(404, "expected /targetdetailsjson/{channel}/{target}");
    };

    let (Ok(channel), Ok(target)) = (urlencoding::decode(channel), urlencoding::decode(target))
    else {
        return Routed::error(400, "bad path encoding");
    };

    if channel != board.channel {
        return Routed::error(404, format!("no channel {}", channel));
    }

    match board.detail_for(&target) {
        Some(detail) => match serde_json::to_string(detail) {
            Ok(json) => Routed::json(200, json),
            Err(e) => Routed::error(500, e.to_string()),
        },
        None => Routed::error(404, format!("no target {}", target)),
    }
}

/// A bound fixture server
pub struct BoardServer {
    server: Server,
    board: Board,
}

impl BoardServer {
    pub fn bind(addr: &str, board: Board) -> Result<Self> {
        let server = Server::http(addr).map_err(|e| Error::Server(e.to_string()))?;
        Ok(Self { server, board })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve until the process ends
    pub fn run(self) -> Result<()> {
        for request in self.server.incoming_requests() {
            if let Err(e) = handle_request(&self.board, request) {
                log::error!("failed to respond: {}", e);
            }
        }
        Ok(())
    }
}

fn handle_request(board: &Board, request: Request) -> std::io::Result<()> {
    let routed = route(board, request.method(), request.url());
    log::info!("{} {} -> {}", request.method(), request.url(), routed.status);

    let mut response = Response::from_string(routed.body).with_status_code(routed.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], routed.content_type.as_bytes()) {
        response = response.with_header(header);
    }
    request.respond(response)
}

/// Start the fixture server on localhost
pub fn start_board_server(port: u16, board: Board) -> Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = BoardServer::bind(&addr, board)?;

    eprintln!("\n\x1b[1;32mscoreboard\x1b[0m fixture server");
    eprintln!("   Channel: {}", server.board.channel);
    eprintln!("   Details: http://localhost:{}/targetdetailsjson/...", port);
    eprintln!("   Press Ctrl+C to stop\n");

    server.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::from_json(
            r#"{
                "channel": "dev room",
                "targets": [{"name": "bob", "score": 3}],
                "details": {"bob": {"reasons": [], "graph": "g.png"}}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_route_detail() {
        let r = route(&board(), &Method::Get, "/targetdetailsjson/dev%20room/bob");
        assert_eq!(r.status, 200);
        assert_eq!(r.content_type, "application/json");
        assert!(r.body.contains("\"graph\":\"g.png\""));
    }

    #[test]
    fn test_route_unknown_target_and_channel() {
        assert_eq!(
            route(&board(), &Method::Get, "/targetdetailsjson/dev%20room/ann").status,
            404
        );
        assert_eq!(
            route(&board(), &Method::Get, "/targetdetailsjson/ops/bob").status,
            404
        );
        assert_eq!(route(&board(), &Method::Get, "/targetdetailsjson/x").status, 404);
        assert_eq!(route(&board(), &Method::Get, "/nope").status, 404);
    }

    #[test]
    fn test_route_board_summary() {
        let r = route(&board(), &Method::Get, "/board?x=1");
        assert_eq!(r.status, 200);
        assert!(r.body.contains("\"channel\":\"dev room\""));
        assert!(r.body.contains("\"name\":\"bob\""));
        assert!(!r.body.contains("details"));
    }

    #[test]
    fn test_route_rejects_post() {
        assert_eq!(
            route(&board(), &Method::Post, "/targetdetailsjson/dev%20room/bob").status,
            405
        );
    }
}
