//! View components for the TUI

pub mod score_table;
