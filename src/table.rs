//! The interactive score table
//!
//! Owns the ordered target list of one channel, the sort state and the
//! detail store. Every mutation ends in `render()`, which rebuilds the
//! `TableView` snapshot synchronously, so a caller never observes a
//! half-sorted table.
//!
//! Sort state machine:
//!
//! ```text
//!             name header              score header
//! {Name,Asc}  -> {Name,Desc} (reverse)  -> {Score,Desc} (fresh sort)
//! {Name,Desc} -> {Name,Asc}  (reverse)  -> {Score,Desc} (fresh sort)
//! {Score,*}   -> {Name,Asc}  (fresh)    -> flip direction (reverse)
//! ```

use crate::detail::{DetailStore, FetchEvent, FetchRequest, RowEntry};
use crate::format::compare_names;
use crate::model::{Target, TargetKey};

pub const UP_ARROW: char = '▲';
pub const DOWN_ARROW: char = '▼';

pub const NAME_LABEL: &str = "Name";
pub const SCORE_LABEL: &str = "Score";

/// Column the table is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Name,
    Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(self) -> char {
        match self {
            SortDirection::Asc => UP_ARROW,
            SortDirection::Desc => DOWN_ARROW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// Header labels of one render, indicator included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub name: String,
    pub score: String,
}

/// One rendered row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub key: TargetKey,
    pub name: String,
    pub score: i64,
    pub entry: RowEntry,
}

/// Snapshot produced by `ScoreTable::render`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub channel: String,
    pub headers: HeaderView,
    pub rows: Vec<RowView>,
    pub sort: SortState,
}

impl TableView {
    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Sorted view of a channel's targets
#[derive(Debug)]
pub struct ScoreTable {
    channel: String,
    targets: Vec<Target>,
    sort: SortState,
    details: DetailStore,
    view: TableView,
    renders: usize,
}

impl ScoreTable {
    /// Build the table sorted by name, ascending, and render it.
    pub fn new(channel: impl Into<String>, targets: Vec<Target>) -> Self {
        let channel = channel.into();
        let sort = SortState {
            key: SortKey::Name,
            direction: SortDirection::Asc,
        };
        let mut table = Self {
            view: TableView {
                channel: channel.clone(),
                headers: HeaderView {
                    name: NAME_LABEL.to_string(),
                    score: SCORE_LABEL.to_string(),
                },
                rows: Vec::new(),
                sort,
            },
            channel,
            targets,
            sort,
            details: DetailStore::new(),
            renders: 0,
        };
        table.sort_fresh(SortKey::Name);
        table.render();
        table
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn details(&self) -> &DetailStore {
        &self.details
    }

    /// Latest render
    pub fn view(&self) -> &TableView {
        &self.view
    }

    /// How many times the table has been rendered
    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Name header clicked
    pub fn sort_by_name(&mut self) {
        self.click(SortKey::Name);
    }

    /// Score header clicked
    pub fn sort_by_score(&mut self) {
        self.click(SortKey::Score);
    }

    pub fn sort_by(&mut self, key: SortKey) {
        self.click(key);
    }

    fn click(&mut self, key: SortKey) {
        if self.sort.key == key {
            // Mirror the current order; no comparison involved
            self.targets.reverse();
            self.sort.direction = self.sort.direction.flipped();
        } else {
            self.sort_fresh(key);
        }
        log::debug!("sorted {} by {:?} {:?}", self.channel, key, self.sort.direction);
        self.render();
    }

    fn sort_fresh(&mut self, key: SortKey) {
        match key {
            SortKey::Name => {
                self.targets.sort_by(|a, b| compare_names(&a.name, &b.name));
                self.sort = SortState {
                    key,
                    direction: SortDirection::Asc,
                };
            }
            SortKey::Score => {
                // Stable: ties keep their current order
                self.targets.sort_by(|a, b| b.score.cmp(&a.score));
                self.sort = SortState {
                    key,
                    direction: SortDirection::Desc,
                };
            }
        }
    }

    /// Rebuild the view from the current order.
    pub fn render(&mut self) {
        let arrow = self.sort.direction.arrow();
        let headers = match self.sort.key {
            SortKey::Name => HeaderView {
                name: format!("{}{}", arrow, NAME_LABEL),
                score: SCORE_LABEL.to_string(),
            },
            SortKey::Score => HeaderView {
                name: NAME_LABEL.to_string(),
                score: format!("{}{}", arrow, SCORE_LABEL),
            },
        };

        let rows = self
            .targets
            .iter()
            .map(|t| {
                let key = TargetKey::new(self.channel.clone(), t.name.clone());
                let entry = self.details.entry(&key).cloned().unwrap_or_default();
                RowView {
                    key,
                    name: t.name.clone(),
                    score: t.score,
                    entry,
                }
            })
            .collect();

        self.view = TableView {
            channel: self.channel.clone(),
            headers,
            rows,
            sort: self.sort,
        };
        self.renders += 1;
    }

    fn key_at(&self, index: usize) -> Option<TargetKey> {
        self.targets
            .get(index)
            .map(|t| TargetKey::new(self.channel.clone(), t.name.clone()))
    }

    /// Row clicked: toggle it, fetching its detail the first time.
    pub fn expand(&mut self, index: usize) -> Option<FetchRequest> {
        let key = self.key_at(index)?;
        let request = self.details.expand(&key);
        self.render();
        request
    }

    /// Expand by target name (case-sensitive, as rendered)
    pub fn expand_target(&mut self, name: &str) -> Option<FetchRequest> {
        let index = self.targets.iter().position(|t| t.name == name)?;
        self.expand(index)
    }

    /// Retry a failed row
    pub fn retry(&mut self, index: usize) -> Option<FetchRequest> {
        let key = self.key_at(index)?;
        let request = self.details.retry(&key);
        if request.is_some() {
            self.render();
        }
        request
    }

    /// Merge a fetch completion; the row order is left untouched.
    pub fn complete(&mut self, event: FetchEvent) -> bool {
        let changed = self.details.complete(event);
        if changed {
            self.render();
        }
        changed
    }
}
