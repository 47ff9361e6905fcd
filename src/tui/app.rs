//! Application state for the TUI

use std::time::Instant;

use ratatui::layout::Rect;

use crate::table::ScoreTable;
use super::state;
use super::ui;
use super::views::score_table;

/// Main application state
pub struct App {
    pub table: ScoreTable,

    // Where details come from (shown in the header)
    pub source_label: String,

    // Selection
    pub selected_index: usize,
    pub scroll_offset: usize,

    // Show full reason text instead of the short form
    pub inspect: bool,
    // First visible line of the selected row's detail block when clipped
    pub detail_scroll: usize,

    pub show_help: bool,

    // Viewport
    pub viewport_width: u16,
    pub viewport_height: u16,

    // Status message
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(table: ScoreTable, source_label: impl Into<String>) -> Self {
        Self {
            table,
            source_label: source_label.into(),
            selected_index: 0,
            scroll_offset: 0,
            inspect: false,
            detail_scroll: 0,
            show_help: false,
            viewport_width: 80,
            viewport_height: 24,
            status_message: None,
        }
    }

    /// Periodic tick for clearing transient state
    pub fn tick(&mut self) {
        // Clear status message after 3 seconds
        if let Some((_, shown_at)) = &self.status_message {
            if shown_at.elapsed().as_secs() >= 3 {
                self.status_message = None;
            }
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.ensure_visible();
    }

    pub fn row_count(&self) -> usize {
        self.table.view().rows.len()
    }

    /// Rendered height of each row, detail block included
    pub fn row_heights(&self) -> Vec<u16> {
        let max_detail = self.max_detail_lines();
        self.table
            .view()
            .rows
            .iter()
            .map(|row| score_table::row_height(row, self.inspect, max_detail))
            .collect()
    }

    /// Inner area of the table block for the current viewport
    pub fn table_inner(&self) -> Rect {
        let area = Rect::new(0, 0, self.viewport_width, self.viewport_height);
        ui::table_inner(ui::layout(area).table)
    }

    /// Lines available for rows (below the header row)
    pub fn body_height(&self) -> u16 {
        self.table_inner().height.saturating_sub(1)
    }

    /// Detail lines an open row may show; the name line must fit too
    pub fn max_detail_lines(&self) -> usize {
        self.body_height().saturating_sub(1) as usize
    }

    pub fn select(&mut self, index: usize) {
        let index = state::clamp_selection(index, self.row_count());
        if index != self.selected_index {
            self.detail_scroll = 0;
        }
        self.selected_index = index;
        self.ensure_visible();
    }

    /// Scroll the selected row's detail block, clamped to its length
    pub fn scroll_detail(&mut self, down: bool) {
        let limit = self
            .table
            .view()
            .rows
            .get(self.selected_index)
            .map(|row| {
                let total = score_table::detail_lines(row, self.inspect).len();
                score_table::detail_scroll_limit(total, self.max_detail_lines())
            })
            .unwrap_or(0);
        self.detail_scroll = if down {
            (self.detail_scroll + 1).min(limit)
        } else {
            self.detail_scroll.saturating_sub(1).min(limit)
        };
    }

    pub fn ensure_visible(&mut self) {
        self.selected_index = state::clamp_selection(self.selected_index, self.row_count());
        self.scroll_offset = state::scroll_offset_for(
            &self.row_heights(),
            self.selected_index,
            self.scroll_offset,
            self.body_height(),
        );
    }

    pub fn page_size(&self) -> usize {
        (self.body_height() as usize).max(1)
    }

    /// Name of the selected target, if any
    pub fn selected_name(&self) -> Option<&str> {
        self.table
            .view()
            .rows
            .get(self.selected_index)
            .map(|r| r.name.as_str())
    }

    /// Keep the same target selected after the order changes
    pub fn reselect(&mut self, name: Option<String>) {
        if let Some(name) = name {
            if let Some(idx) = self.table.view().rows.iter().position(|r| r.name == name) {
                self.selected_index = idx;
            }
        }
        self.ensure_visible();
    }
}
