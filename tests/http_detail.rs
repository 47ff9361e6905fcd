//! Detail fetches over real HTTP
//!
//! Runs the fixture server in-process on an ephemeral port and points the
//! HTTP client at it, then drives a table through the full expand/fetch/
//! complete cycle.

use std::net::SocketAddr;
use std::thread;

use scoreboard::client::{DetailSource, HttpDetailSource};
use scoreboard::detail::FetchEvent;
use scoreboard::serve::BoardServer;
use scoreboard::{Board, DetailError, ExpansionState, ScoreTable, TargetKey};

const BOARD: &str = r#"{
    "channel": "dev room",
    "targets": [
        {"name": "bob", "score": 3},
        {"name": "Ann", "score": 5}
    ],
    "details": {
        "bob": {
            "reasons": [
                {"action": "++", "sender": "alice", "reason": "bob++ for helping", "timestampMsec": 1700000000000}
            ],
            "graph": "http://chart/bob.png"
        },
        "Ann": {"graph": 7}
    }
}"#;

/// Start a fixture server in a background thread
fn start_server() -> SocketAddr {
    let board = Board::from_json(BOARD).unwrap();
    let server = BoardServer::bind("127.0.0.1:0", board).unwrap();
    let addr = server.local_addr().unwrap();
    thread::spawn(move || server.run());
    addr
}

fn client(addr: SocketAddr) -> HttpDetailSource {
    HttpDetailSource::new(format!("http://{}", addr), 5_000).unwrap()
}

#[tokio::test]
async fn test_fetch_detail_encodes_channel() {
    let source = client(start_server());
    let resp = source
        .fetch_detail(&TargetKey::new("dev room", "bob"))
        .await
        .unwrap();

    assert!(resp.is_well_formed());
    assert_eq!(resp.reasons.len(), 1);
    assert_eq!(resp.reasons[0].sender, "alice");
    assert_eq!(resp.graph.as_deref(), Some("http://chart/bob.png"));
}

#[tokio::test]
async fn test_unknown_target_is_status_error() {
    let source = client(start_server());
    let err = source
        .fetch_detail(&TargetKey::new("dev room", "nobody"))
        .await
        .unwrap_err();

    assert!(matches!(err, DetailError::Status { status: 404, .. }));
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn test_unknown_channel_is_status_error() {
    let source = client(start_server());
    let err = source
        .fetch_detail(&TargetKey::new("ops", "bob"))
        .await
        .unwrap_err();
    assert!(matches!(err, DetailError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_malformed_payload_is_normalized() {
    let source = client(start_server());
    let resp = source
        .fetch_detail(&TargetKey::new("dev room", "Ann"))
        .await
        .unwrap();

    assert!(resp.reasons.is_empty());
    assert!(resp.graph.is_none());
    assert!(!resp.is_well_formed());
}

#[tokio::test]
async fn test_table_expand_cycle_over_http() {
    let source = client(start_server());
    let board = Board::from_json(BOARD).unwrap();
    let mut table = ScoreTable::new(board.channel.clone(), board.targets());

    // Ann, bob
    let request = table.expand(1).unwrap();
    assert_eq!(request.key, TargetKey::new("dev room", "bob"));
    assert!(table.expand(1).is_none());
    assert!(table.expand(1).is_none());

    let result = source.fetch_detail(&request.key).await;
    assert!(table.complete(FetchEvent {
        key: request.key,
        result,
    }));

    let row = &table.view().rows[1];
    assert_eq!(row.name, "bob");
    match &row.entry.state {
        ExpansionState::Expanded(detail) => {
            assert_eq!(detail.reasons.len(), 1);
            assert!(detail.notice.is_none());
        }
        other => panic!("expected expanded row, got {:?}", other),
    }
    assert_eq!(table.details().fetches_issued(), 1);
}
