//! Terminal User Interface for the scoreboard
//!
//! One sortable table of targets. Rows expand in place to show the
//! reasons behind a score; those are fetched lazily on first expansion
//! by a background worker so the UI never blocks on the network.
//!
//! The layout follows The Elm Architecture:
//! - `msg`: what happened (keys, mouse, fetch completions)
//! - `update`: state transitions, returning `Cmd`s for the runtime
//! - `app` / `state`: the model and pure helpers
//! - `ui` / `views`: drawing

pub mod app;
pub mod msg; // TEA message types (what happened)
pub mod state; // Pure state transformations (functional core)
pub mod ui;
pub mod update; // TEA update function (state transitions)
pub mod views;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::client::DetailSource;
use crate::detail::{FetchEvent, FetchRequest};
use crate::error::{Error, Result};
use crate::fetch::run_detail_fetch;
use crate::table::ScoreTable;
use app::App;
use msg::{key_to_msg, Msg};
use update::{update, Cmd};

/// Run the TUI application
pub fn run(table: ScoreTable, source: Arc<dyn DetailSource>, source_label: &str) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    let (request_tx, request_rx) = mpsc::unbounded_channel::<FetchRequest>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<FetchEvent>();
    runtime.spawn(run_detail_fetch(source, request_rx, event_tx));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(table, source_label);
    let result = terminal
        .size()
        .map_err(Error::from)
        .and_then(|size| {
            app.resize(size.width, size.height);
            run_event_loop(&mut terminal, &mut app, request_tx, event_rx)
        });

    // Restore terminal - this MUST run even if app fails
    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    );
    let _ = terminal.show_cursor();

    // Outstanding fetches are abandoned
    runtime.shutdown_timeout(Duration::from_millis(200));
    log::info!("tui closed");

    result
}

fn run_event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    requests: UnboundedSender<FetchRequest>,
    mut events: UnboundedReceiver<FetchEvent>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        // Draw the UI
        terminal.draw(|f| ui::draw(f, app))?;

        // Handle input with timeout
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if poll(timeout)? {
            let msg = match read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    key_to_msg(key.code, key.modifiers, app.show_help)
                }
                Event::Mouse(mouse) => Msg::Mouse(mouse),
                Event::Resize(width, height) => Msg::Resize(width, height),
                _ => Msg::Noop,
            };
            if execute_cmd(update(app, msg), &requests)? {
                return Ok(());
            }
        }

        // Fetch completions (non-blocking)
        loop {
            match events.try_recv() {
                Ok(event) => {
                    execute_cmd(update(app, Msg::DetailFetched(event)), &requests)?;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return Err(Error::Terminal("detail fetcher stopped".into()));
                }
            }
        }

        // Tick for status expiry
        if last_tick.elapsed() >= tick_rate {
            update(app, Msg::Tick);
            last_tick = Instant::now();
        }
    }
}

/// Execute a command. Returns true when the app should quit.
fn execute_cmd(cmd: Cmd, requests: &UnboundedSender<FetchRequest>) -> Result<bool> {
    match cmd {
        Cmd::None => Ok(false),
        Cmd::Quit => Ok(true),
        Cmd::FetchDetail(request) => {
            log::debug!("requesting detail for {}", request.key);
            requests
                .send(request)
                .map_err(|_| Error::Terminal("detail fetcher stopped".into()))?;
            Ok(false)
        }
        Cmd::Batch(cmds) => {
            let mut quit = false;
            for cmd in cmds {
                quit |= execute_cmd(cmd, requests)?;
            }
            Ok(quit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TargetKey;

    #[test]
    fn test_execute_cmd_forwards_fetches() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let key = TargetKey::new("dev", "bob");
        let quit = execute_cmd(
            Cmd::Batch(vec![
                Cmd::FetchDetail(FetchRequest { key: key.clone() }),
                Cmd::None,
            ]),
            &tx,
        )
        .unwrap();
        assert!(!quit);
        assert_eq!(rx.try_recv().unwrap().key, key);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_execute_cmd_quit() {
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(execute_cmd(Cmd::Quit, &tx).unwrap());
        assert!(execute_cmd(Cmd::batch(vec![Cmd::None, Cmd::Quit]), &tx).unwrap());
    }

    #[test]
    fn test_execute_cmd_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let key = TargetKey::new("dev", "bob");
        assert!(execute_cmd(Cmd::FetchDetail(FetchRequest { key }), &tx).is_err());
    }
}
