//! Pure state calculations for the TUI (Functional Core)
//!
//! No I/O here. Row heights vary because an open row carries its detail
//! block underneath, so scrolling and hit testing work on a list of
//! per-row heights rather than a fixed item size.

use crate::table::SortKey;

// =============================================================================
// Navigation - Pure index calculations
// =============================================================================

/// Calculate new selected index after moving up
pub fn move_selection_up(current: usize) -> usize {
    current.saturating_sub(1)
}

/// Calculate new selected index after moving down
pub fn move_selection_down(current: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        (current + 1).min(max - 1)
    }
}

/// Calculate new selected index after page down
pub fn page_down(current: usize, page_size: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        (current + page_size).min(max - 1)
    }
}

/// Calculate new selected index after page up
pub fn page_up(current: usize, page_size: usize) -> usize {
    current.saturating_sub(page_size)
}

/// Clamp selection index to valid range
pub fn clamp_selection(selected: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        selected.min(max - 1)
    }
}

// =============================================================================
// Variable-height rows
// =============================================================================

/// Scroll offset (first visible row) that keeps `selected` on screen.
///
/// Scrolls as little as possible; a selected row taller than the
/// viewport is pinned to the top.
pub fn scroll_offset_for(
    heights: &[u16],
    selected: usize,
    current_offset: usize,
    visible_height: u16,
) -> usize {
    if heights.is_empty() || visible_height == 0 {
        return 0;
    }
    let selected = selected.min(heights.len() - 1);
    if selected < current_offset {
        return selected;
    }

    let mut offset = current_offset.min(selected);
    while offset < selected {
        let used: u32 = heights[offset..=selected].iter().map(|&h| h as u32).sum();
        if used <= visible_height as u32 {
            break;
        }
        offset += 1;
    }
    offset
}

/// Row under body line `y` (0 = first line below the header row)
pub fn row_at(heights: &[u16], offset: usize, y: u16) -> Option<usize> {
    let mut top: u32 = 0;
    for (idx, &h) in heights.iter().enumerate().skip(offset) {
        let bottom = top + h as u32;
        if (y as u32) < bottom {
            return Some(idx);
        }
        top = bottom;
    }
    None
}

/// Which header a click at column `x` (relative to the table's inner
/// area) lands on. The score column is the right-most `score_width`
/// cells.
pub fn header_at(x: u16, inner_width: u16, score_width: u16) -> SortKey {
    if x >= inner_width.saturating_sub(score_width) {
        SortKey::Score
    } else {
        SortKey::Name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_selection() {
        assert_eq!(move_selection_up(5), 4);
        assert_eq!(move_selection_up(0), 0);

        assert_eq!(move_selection_down(5, 10), 6);
        assert_eq!(move_selection_down(9, 10), 9);
        assert_eq!(move_selection_down(0, 0), 0);
    }

    #[test]
    fn test_page_navigation() {
        assert_eq!(page_down(0, 10, 100), 10);
        assert_eq!(page_down(95, 10, 100), 99);
        assert_eq!(page_down(3, 10, 0), 0);

        assert_eq!(page_up(15, 10), 5);
        assert_eq!(page_up(5, 10), 0);
    }

    #[test]
    fn test_clamp_selection() {
        assert_eq!(clamp_selection(5, 10), 5);
        assert_eq!(clamp_selection(15, 10), 9);
        assert_eq!(clamp_selection(5, 0), 0);
    }

    #[test]
    fn test_scroll_offset_uniform_rows() {
        let heights = vec![1; 20];
        // Selection visible - no change
        assert_eq!(scroll_offset_for(&heights, 5, 0, 10), 0);
        // Below viewport - scroll down just enough
        assert_eq!(scroll_offset_for(&heights, 12, 0, 10), 3);
        // Above viewport - snap to selection
        assert_eq!(scroll_offset_for(&heights, 2, 5, 10), 2);
    }

    #[test]
    fn test_scroll_offset_tall_rows() {
        // Row 1 is expanded with 6 detail lines
        let heights = vec![1, 7, 1, 1];
        assert_eq!(scroll_offset_for(&heights, 2, 0, 8), 1);
        assert_eq!(scroll_offset_for(&heights, 1, 0, 8), 0);
        // Taller than the viewport: pinned to the top
        assert_eq!(scroll_offset_for(&heights, 1, 0, 4), 1);
    }

    #[test]
    fn test_scroll_offset_degenerate() {
        assert_eq!(scroll_offset_for(&[], 3, 2, 10), 0);
        assert_eq!(scroll_offset_for(&[1, 1], 1, 0, 0), 0);
    }

    #[test]
    fn test_row_at() {
        let heights = vec![1, 3, 1];
        assert_eq!(row_at(&heights, 0, 0), Some(0));
        assert_eq!(row_at(&heights, 0, 1), Some(1));
        assert_eq!(row_at(&heights, 0, 3), Some(1));
        assert_eq!(row_at(&heights, 0, 4), Some(2));
        assert_eq!(row_at(&heights, 0, 5), None);
        // Scrolled past the first row
        assert_eq!(row_at(&heights, 1, 0), Some(1));
        assert_eq!(row_at(&heights, 1, 3), Some(2));
    }

    #[test]
    fn test_header_at() {
        assert_eq!(header_at(0, 40, 8), SortKey::Name);
        assert_eq!(header_at(31, 40, 8), SortKey::Name);
        assert_eq!(header_at(32, 40, 8), SortKey::Score);
        assert_eq!(header_at(39, 40, 8), SortKey::Score);
    }
}
