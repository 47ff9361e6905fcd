//! Scoreboard - a sortable karma table with lazily loaded reasons
//!
//! Browse one channel's targets, sort them by name or score, and expand
//! any row to see who gave or took points and why.
//!
//! # Overview
//!
//! A [`ScoreTable`] owns the target list and its sort state. Clicking the
//! active column reverses the rows; clicking the other column runs a fresh
//! sort (names ascending, scores descending). Every change produces a new
//! [`table::TableView`] with a ▲/▼ indicator on the active header.
//!
//! Row details live in a [`DetailStore`]. The first expansion of a row
//! marks it loading and hands back a [`detail::FetchRequest`]; later
//! expansions only toggle visibility. Completions are merged with
//! [`ScoreTable::complete`] and never reorder the table.
//!
//! # Quick Start
//!
//! ```
//! use scoreboard::{ScoreTable, Target};
//!
//! let mut table = ScoreTable::new("dev", vec![
//!     Target::new("dev", "Zed", 1),
//!     Target::new("dev", "Ann", 5),
//! ]);
//! assert_eq!(table.view().names(), vec!["Ann", "Zed"]);
//!
//! table.sort_by_score();
//! table.sort_by_score();
//! assert_eq!(table.view().names(), vec!["Zed", "Ann"]);
//! assert_eq!(table.view().headers.score, "▲Score");
//!
//! // First expansion asks for a fetch, the second only collapses
//! assert!(table.expand(0).is_some());
//! assert!(table.expand(0).is_none());
//! ```

pub mod channels;
pub mod client;
pub mod config;
pub mod detail;
pub mod error;
pub mod fetch;
pub mod format;
pub mod logging;
pub mod model;
pub mod serve;
pub mod table;
pub mod tui;

pub use channels::{ChannelSummary, UserChannels};
pub use config::Config;
pub use detail::{DetailStore, ExpansionState, ReasonView};
pub use error::{DetailError, Error, Result};
pub use model::{Action, Board, Reason, Target, TargetDetail, TargetKey};
pub use table::{ScoreTable, SortDirection, SortKey, SortState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Core types are re-exported from the crate root
        let table = ScoreTable::new("dev", vec![Target::new("dev", "bob", 1)]);
        assert_eq!(table.sort_state().key, SortKey::Name);
        assert_eq!(DetailStore::new().fetches_issued(), 0);
    }
}
