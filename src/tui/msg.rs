//! TEA Message Types for the TUI
//!
//! Messages describe what happened; `update` decides what it means.
//! Key and mouse input, fetch completions and ticks all arrive as `Msg`.

use crossterm::event::{KeyCode, KeyModifiers, MouseEvent};

use crate::detail::FetchEvent;

/// All possible messages/actions in the TUI
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    // === Navigation ===
    /// Move selection up by one
    MoveUp,
    /// Move selection down by one
    MoveDown,
    /// Move selection up by page
    PageUp,
    /// Move selection down by page
    PageDown,
    /// Jump to first row
    JumpToTop,
    /// Jump to last row
    JumpToBottom,

    // === Sorting (header clicks) ===
    SortByName,
    SortByScore,

    // === Rows ===
    /// Expand/collapse the selected row
    ToggleExpand,
    /// Expand/collapse a row by index (mouse)
    ToggleExpandAt(usize),
    /// Re-fetch the selected row after a failure
    RetrySelected,
    /// Show full reason text instead of the short form
    ToggleInspect,
    /// Scroll a clipped detail block
    ScrollDetailDown,
    ScrollDetailUp,

    // === Modals ===
    ToggleHelp,
    CloseModal,

    // === Async ===
    /// A detail fetch finished
    DetailFetched(FetchEvent),

    // === Lifecycle ===
    Quit,
    Tick,
    Resize(u16, u16),
    Mouse(MouseEvent),

    /// No operation (for unhandled keys)
    Noop,
}

/// Convert a key event to a message
///
/// Pure pattern matching; the help overlay swallows everything except
/// the keys that close it.
pub fn key_to_msg(code: KeyCode, modifiers: KeyModifiers, help_open: bool) -> Msg {
    if help_open {
        return match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Msg::CloseModal,
            _ => Msg::Noop,
        };
    }

    match code {
        // Quit
        KeyCode::Char('q') => Msg::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Msg::Quit,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => Msg::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Msg::MoveUp,
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => Msg::PageDown,
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => Msg::PageUp,
        KeyCode::Char('g') | KeyCode::Home => Msg::JumpToTop,
        KeyCode::Char('G') | KeyCode::End => Msg::JumpToBottom,
        KeyCode::PageDown => Msg::PageDown,
        KeyCode::PageUp => Msg::PageUp,

        // Sorting
        KeyCode::Char('n') => Msg::SortByName,
        KeyCode::Char('s') => Msg::SortByScore,

        // Rows
        KeyCode::Enter | KeyCode::Char(' ') => Msg::ToggleExpand,
        KeyCode::Char('r') => Msg::RetrySelected,
        KeyCode::Char('i') => Msg::ToggleInspect,
        KeyCode::Char('J') => Msg::ScrollDetailDown,
        KeyCode::Char('K') => Msg::ScrollDetailUp,

        // Modals
        KeyCode::Char('?') => Msg::ToggleHelp,
        KeyCode::Esc => Msg::CloseModal,

        _ => Msg::Noop,
    }
}
