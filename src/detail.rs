//! Lazy, idempotent detail expansion
//!
//! One entry per (channel, target). Expanding a row toggles its visual
//! disclosure and, the first time only, asks for the detail to be
//! fetched. The entry is marked `Loading` before the request leaves, so
//! a second expand while the fetch is in flight never issues another.
//!
//! ```text
//! Collapsed --expand--> Loading --ok/malformed--> Expanded
//!                          |
//!                          +--error--> Failed --expand/retry--> Loading
//! ```
//!
//! `Expanded` is terminal for the data: the detail is kept for the life
//! of the store. Only the visual `open` flag keeps toggling.

use std::collections::HashMap;

use crate::error::DetailError;
use crate::format::{format_date, short_reason};
use crate::model::{Action, DetailResponse, Reason, TargetDetail, TargetKey};

/// Load state of one row's detail
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExpansionState {
    /// Never fetched
    #[default]
    Collapsed,
    /// Fetch in flight
    Loading,
    /// Detail cached for the lifetime of the store
    Expanded(TargetDetail),
    /// Fetch failed; expanding again retries
    Failed(String),
}

impl ExpansionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ExpansionState::Loading)
    }

    pub fn detail(&self) -> Option<&TargetDetail> {
        match self {
            ExpansionState::Expanded(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Per-row entry: load state plus the visual disclosure flag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowEntry {
    pub state: ExpansionState,
    pub open: bool,
}

/// A fetch the runtime must perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub key: TargetKey,
}

/// Result of a fetch, delivered back to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchEvent {
    pub key: TargetKey,
    pub result: Result<DetailResponse, DetailError>,
}

/// Explicit mapping from target key to expansion state + cached detail
#[derive(Debug, Default)]
pub struct DetailStore {
    entries: HashMap<TargetKey, RowEntry>,
    fetches_issued: usize,
}

impl DetailStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the row and request a fetch if nothing is loaded or loading.
    pub fn expand(&mut self, key: &TargetKey) -> Option<FetchRequest> {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.open = !entry.open;

        match entry.state {
            ExpansionState::Loading | ExpansionState::Expanded(_) => None,
            ExpansionState::Collapsed => {
                entry.state = ExpansionState::Loading;
                self.fetches_issued += 1;
                log::debug!("fetching detail for {}", key);
                Some(FetchRequest { key: key.clone() })
            }
            ExpansionState::Failed(_) => {
                // A failed row reopens while the retry runs
                entry.open = true;
                entry.state = ExpansionState::Loading;
                self.fetches_issued += 1;
                log::info!("retrying detail fetch for {}", key);
                Some(FetchRequest { key: key.clone() })
            }
        }
    }

    /// Retry a failed row without toggling it. No-op in any other state.
    pub fn retry(&mut self, key: &TargetKey) -> Option<FetchRequest> {
        let entry = self.entries.get_mut(key)?;
        if !matches!(entry.state, ExpansionState::Failed(_)) {
            return None;
        }
        entry.open = true;
        entry.state = ExpansionState::Loading;
        self.fetches_issued += 1;
        log::info!("retrying detail fetch for {}", key);
        Some(FetchRequest { key: key.clone() })
    }

    /// Merge a completed fetch. Completions for rows that are not
    /// loading are stale and ignored; returns whether state changed.
    pub fn complete(&mut self, event: FetchEvent) -> bool {
        let Some(entry) = self.entries.get_mut(&event.key) else {
            log::warn!("ignoring detail for unknown row {}", event.key);
            return false;
        };
        if !entry.state.is_loading() {
            log::debug!("ignoring stale detail for {}", event.key);
            return false;
        }

        let target = event.key.target.clone();
        entry.state = match event.result {
            Ok(response) => {
                if !response.is_well_formed() {
                    log::warn!(
                        "normalized detail for {}: {}",
                        event.key,
                        response.problems.join(", ")
                    );
                }
                ExpansionState::Expanded(TargetDetail::from_response(target, response))
            }
            Err(err) if err.is_recoverable() => {
                log::warn!("detail for {} unreadable: {}", event.key, err);
                ExpansionState::Expanded(TargetDetail::empty(target, err.to_string()))
            }
            Err(err) => {
                log::error!("detail fetch for {} failed: {}", event.key, err);
                ExpansionState::Failed(err.to_string())
            }
        };
        true
    }

    pub fn entry(&self, key: &TargetKey) -> Option<&RowEntry> {
        self.entries.get(key)
    }

    pub fn state(&self, key: &TargetKey) -> ExpansionState {
        self.entries
            .get(key)
            .map(|e| e.state.clone())
            .unwrap_or_default()
    }

    pub fn is_open(&self, key: &TargetKey) -> bool {
        self.entries.get(key).map(|e| e.open).unwrap_or(false)
    }

    /// Number of fetches handed out since creation
    pub fn fetches_issued(&self) -> usize {
        self.fetches_issued
    }

    pub fn loading_count(&self) -> usize {
        self.entries.values().filter(|e| e.state.is_loading()).count()
    }
}

/// Display form of one reason entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonView {
    pub action: Action,
    pub sender: String,
    /// Text after `<target><action>`, if any
    pub short_text: Option<String>,
    /// Full original text, always kept for inspection
    pub full_text: String,
    pub date: String,
}

impl ReasonView {
    pub fn new(target: &str, reason: &Reason) -> Self {
        Self {
            action: reason.action.clone(),
            sender: reason.sender.clone(),
            short_text: short_reason(target, &reason.action, &reason.reason_text),
            full_text: reason.reason_text.clone(),
            date: format_date(reason.timestamp_msec),
        }
    }
}

/// Build the reason entries of a detail block, in server order
pub fn reason_views(detail: &TargetDetail) -> Vec<ReasonView> {
    detail
        .reasons
        .iter()
        .map(|r| ReasonView::new(&detail.target, r))
        .collect()
}
