//! TEA Update Function
//!
//! ```text
//! update : Msg -> App -> Cmd
//! ```
//!
//! Every state change goes through here. Work that leaves the UI thread
//! (detail fetches, quitting) comes back as a `Cmd` for the runtime to
//! execute.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use super::app::App;
use super::msg::Msg;
use super::state;
use crate::detail::FetchRequest;
use crate::table::SortKey;

/// Commands that need to be executed by the runtime (imperative shell)
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// No command
    None,
    /// Multiple commands to execute
    Batch(Vec<Cmd>),
    /// Quit the application
    Quit,
    /// Hand a detail fetch to the background worker
    FetchDetail(FetchRequest),
}

impl Cmd {
    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Cmd {
        // Filter out None commands
        let mut cmds: Vec<Cmd> = cmds
            .into_iter()
            .filter(|c| !matches!(c, Cmd::None))
            .collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.pop().unwrap_or(Cmd::None), // Safe: len == 1 guarantees element
            _ => Cmd::Batch(cmds),
        }
    }

    /// Check if this is a quit command
    pub fn is_quit(&self) -> bool {
        matches!(self, Cmd::Quit)
    }

    fn from_fetch(request: Option<FetchRequest>) -> Cmd {
        request.map(Cmd::FetchDetail).unwrap_or(Cmd::None)
    }
}

/// Process a message against the app state
pub fn update(app: &mut App, msg: Msg) -> Cmd {
    match msg {
        // === Lifecycle ===
        Msg::Quit => Cmd::Quit,
        Msg::Tick => {
            app.tick();
            Cmd::None
        }
        Msg::Resize(w, h) => {
            app.resize(w, h);
            Cmd::None
        }
        Msg::Noop => Cmd::None,

        // === Navigation ===
        Msg::MoveUp => {
            app.select(state::move_selection_up(app.selected_index));
            Cmd::None
        }
        Msg::MoveDown => {
            app.select(state::move_selection_down(app.selected_index, app.row_count()));
            Cmd::None
        }
        Msg::PageUp => {
            app.select(state::page_up(app.selected_index, app.page_size()));
            Cmd::None
        }
        Msg::PageDown => {
            app.select(state::page_down(
                app.selected_index,
                app.page_size(),
                app.row_count(),
            ));
            Cmd::None
        }
        Msg::JumpToTop => {
            app.scroll_offset = 0;
            app.select(0);
            Cmd::None
        }
        Msg::JumpToBottom => {
            app.select(app.row_count().saturating_sub(1));
            Cmd::None
        }

        // === Sorting ===
        Msg::SortByName => {
            sort(app, SortKey::Name);
            Cmd::None
        }
        Msg::SortByScore => {
            sort(app, SortKey::Score);
            Cmd::None
        }

        // === Rows ===
        Msg::ToggleExpand => {
            let idx = app.selected_index;
            toggle_row(app, idx)
        }
        Msg::ToggleExpandAt(idx) => {
            app.select(idx);
            toggle_row(app, idx)
        }
        Msg::RetrySelected => {
            let cmd = Cmd::from_fetch(app.table.retry(app.selected_index));
            if cmd == Cmd::None {
                app.set_status("Nothing to retry");
            }
            app.ensure_visible();
            cmd
        }
        Msg::ToggleInspect => {
            app.inspect = !app.inspect;
            app.set_status(if app.inspect {
                "Showing full reason text"
            } else {
                "Showing short reasons"
            });
            app.ensure_visible();
            Cmd::None
        }
        Msg::ScrollDetailDown => {
            app.scroll_detail(true);
            Cmd::None
        }
        Msg::ScrollDetailUp => {
            app.scroll_detail(false);
            Cmd::None
        }

        // === Modals ===
        Msg::ToggleHelp => {
            app.show_help = !app.show_help;
            Cmd::None
        }
        Msg::CloseModal => {
            app.show_help = false;
            Cmd::None
        }

        // === Async ===
        Msg::DetailFetched(event) => {
            let failed = event.result.as_ref().err().map(|e| (event.key.clone(), e.clone()));
            app.table.complete(event);
            if let Some((key, err)) = failed {
                if !err.is_recoverable() {
                    app.set_status(format!("Could not load {}: {}", key.target, err));
                }
            }
            app.ensure_visible();
            Cmd::None
        }

        Msg::Mouse(event) => handle_mouse(app, event),
    }
}

fn sort(app: &mut App, key: SortKey) {
    let selected = app.selected_name().map(str::to_string);
    app.table.sort_by(key);
    app.reselect(selected);
}

fn toggle_row(app: &mut App, idx: usize) -> Cmd {
    app.detail_scroll = 0;
    let cmd = Cmd::from_fetch(app.table.expand(idx));
    app.ensure_visible();
    cmd
}

fn handle_mouse(app: &mut App, event: MouseEvent) -> Cmd {
    // The help overlay covers the table
    if app.show_help {
        return Cmd::None;
    }

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let inner = app.table_inner();
            if event.column < inner.x
                || event.column >= inner.x + inner.width
                || event.row < inner.y
                || event.row >= inner.y + inner.height
            {
                return Cmd::None;
            }

            if event.row == inner.y {
                let key = state::header_at(
                    event.column - inner.x,
                    inner.width,
                    super::views::score_table::SCORE_WIDTH,
                );
                sort(app, key);
                return Cmd::None;
            }

            let body_y = event.row - inner.y - 1;
            match state::row_at(&app.row_heights(), app.scroll_offset, body_y) {
                Some(idx) => update(app, Msg::ToggleExpandAt(idx)),
                None => Cmd::None,
            }
        }
        MouseEventKind::ScrollDown => update(app, Msg::MoveDown),
        MouseEventKind::ScrollUp => update(app, Msg::MoveUp),
        _ => Cmd::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::FetchEvent;
    use crate::error::DetailError;
    use crate::model::{Action, DetailResponse, Reason, Target, TargetKey};
    use crate::table::{ScoreTable, SortDirection};
    use crossterm::event::KeyModifiers;

    fn app() -> App {
        let targets = vec![
            Target::new("dev", "Zed", 1),
            Target::new("dev", "Ann", 5),
            Target::new("dev", "bob", 3),
        ];
        App::new(ScoreTable::new("dev", targets), "test")
    }

    fn click(column: u16, row: u16) -> Msg {
        Msg::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_cmd_batch() {
        assert_eq!(Cmd::batch(vec![Cmd::None, Cmd::None]), Cmd::None);
        assert_eq!(Cmd::batch(vec![Cmd::None, Cmd::Quit]), Cmd::Quit);
        assert!(matches!(
            Cmd::batch(vec![Cmd::Quit, Cmd::Quit]),
            Cmd::Batch(v) if v.len() == 2
        ));
        assert!(Cmd::Quit.is_quit());
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        assert!(update(&mut app, Msg::Quit).is_quit());
    }

    #[test]
    fn test_sort_keeps_selection_on_target() {
        let mut app = app();
        // Ann, bob, Zed
        update(&mut app, Msg::MoveDown);
        assert_eq!(app.selected_name(), Some("bob"));

        update(&mut app, Msg::SortByScore);
        // Ann(5), bob(3), Zed(1)
        assert_eq!(app.selected_name(), Some("bob"));
        update(&mut app, Msg::SortByScore);
        // Zed, bob, Ann
        assert_eq!(app.selected_name(), Some("bob"));
        assert_eq!(app.table.sort_state().direction, SortDirection::Asc);
    }

    #[test]
    fn test_expand_issues_one_fetch() {
        let mut app = app();
        let req = match update(&mut app, Msg::ToggleExpand) {
            Cmd::FetchDetail(req) => req,
            other => panic!("expected a fetch, got {:?}", other),
        };
        assert_eq!(req.key, TargetKey::new("dev", "Ann"));

        // Second press while loading
        assert_eq!(update(&mut app, Msg::ToggleExpand), Cmd::None);

        update(
            &mut app,
            Msg::DetailFetched(FetchEvent {
                key: req.key,
                result: Ok(DetailResponse::default()),
            }),
        );
        assert_eq!(update(&mut app, Msg::ToggleExpand), Cmd::None);
        assert_eq!(app.table.details().fetches_issued(), 1);
    }

    #[test]
    fn test_failed_fetch_sets_status_and_retries() {
        let mut app = app();
        let Cmd::FetchDetail(req) = update(&mut app, Msg::ToggleExpand) else {
            panic!("expected a fetch");
        };
        update(
            &mut app,
            Msg::DetailFetched(FetchEvent {
                key: req.key,
                result: Err(DetailError::Http("refused".into())),
            }),
        );
        assert!(app
            .status_message
            .as_ref()
            .is_some_and(|(m, _)| m.contains("Could not load Ann")));

        assert!(matches!(
            update(&mut app, Msg::RetrySelected),
            Cmd::FetchDetail(_)
        ));
        assert_eq!(update(&mut app, Msg::RetrySelected), Cmd::None);
    }

    #[test]
    fn test_header_clicks_sort() {
        let mut app = app();
        let inner = app.table_inner();

        // Score header sits at the right edge
        update(&mut app, click(inner.x + inner.width - 1, inner.y));
        assert_eq!(app.table.sort_state().key, SortKey::Score);

        update(&mut app, click(inner.x, inner.y));
        assert_eq!(app.table.sort_state().key, SortKey::Name);
        assert_eq!(app.table.sort_state().direction, SortDirection::Asc);
    }

    #[test]
    fn test_row_click_expands_that_row() {
        let mut app = app();
        let inner = app.table_inner();
        // Third body line -> Zed
        let cmd = update(&mut app, click(inner.x + 1, inner.y + 3));
        assert_eq!(
            cmd,
            Cmd::FetchDetail(FetchRequest {
                key: TargetKey::new("dev", "Zed")
            })
        );
        assert_eq!(app.selected_name(), Some("Zed"));
    }

    #[test]
    fn test_click_outside_table_ignored() {
        let mut app = app();
        assert_eq!(update(&mut app, click(0, 0)), Cmd::None);
        // Below the last row
        let inner = app.table_inner();
        assert_eq!(update(&mut app, click(inner.x + 1, inner.y + 10)), Cmd::None);
        assert_eq!(app.table.details().fetches_issued(), 0);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = app();
        update(&mut app, Msg::ToggleHelp);
        assert!(app.show_help);
        update(&mut app, Msg::CloseModal);
        assert!(!app.show_help);
    }

    #[test]
    fn test_inspect_toggle() {
        let mut app = app();
        update(&mut app, Msg::ToggleInspect);
        assert!(app.inspect);
        update(&mut app, Msg::ToggleInspect);
        assert!(!app.inspect);
    }

    #[test]
    fn test_mouse_ignored_while_help_open() {
        let mut app = app();
        let inner = app.table_inner();
        update(&mut app, Msg::ToggleHelp);

        assert_eq!(update(&mut app, click(inner.x + inner.width - 1, inner.y)), Cmd::None);
        assert_eq!(update(&mut app, click(inner.x + 1, inner.y + 1)), Cmd::None);
        assert_eq!(app.table.sort_state().key, SortKey::Name);
        assert_eq!(app.table.details().fetches_issued(), 0);
    }

    #[test]
    fn test_detail_scroll_keys_clamp() {
        let mut app = app();
        app.resize(60, 12);
        let req = match update(&mut app, Msg::ToggleExpand) {
            Cmd::FetchDetail(req) => req,
            other => panic!("expected a fetch, got {:?}", other),
        };
        let reasons = (0..20)
            .map(|i| Reason {
                action: Action::PlusPlus,
                sender: format!("user{}", i),
                reason_text: "Ann++".into(),
                timestamp_msec: 1_700_000_000_000,
            })
            .collect();
        update(
            &mut app,
            Msg::DetailFetched(FetchEvent {
                key: req.key,
                result: Ok(DetailResponse {
                    reasons,
                    graph: None,
                    problems: vec![],
                }),
            }),
        );

        // 21 detail lines, 6 visible (5 + marker): at most 16 steps down
        for _ in 0..40 {
            update(&mut app, Msg::ScrollDetailDown);
        }
        assert_eq!(app.detail_scroll, 16);
        update(&mut app, Msg::ScrollDetailUp);
        assert_eq!(app.detail_scroll, 15);

        // The open row fits in the body
        assert_eq!(app.row_heights()[0], 7);
        assert_eq!(app.scroll_offset, 0);

        update(&mut app, Msg::MoveDown);
        assert_eq!(app.detail_scroll, 0);
    }
}
