//! Score table view - sortable rows with inline reason blocks

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::detail::{reason_views, ExpansionState, ReasonView};
use crate::format::truncate_str;
use crate::table::RowView;
use crate::tui::app::App;

/// Width of the score column, in cells
pub const SCORE_WIDTH: u16 = 8;

const DETAIL_INDENT: &str = "    ";

/// Lines shown under an open row
pub fn detail_lines(row: &RowView, inspect: bool) -> Vec<Line<'static>> {
    if !row.entry.open {
        return Vec::new();
    }

    match &row.entry.state {
        ExpansionState::Collapsed => Vec::new(),
        ExpansionState::Loading => vec![Line::from(Span::styled(
            format!("{}loading...", DETAIL_INDENT),
            Style::default().fg(Color::DarkGray).italic(),
        ))],
        ExpansionState::Failed(message) => vec![Line::from(vec![
            Span::styled(
                format!("{}✗ {}", DETAIL_INDENT, message),
                Style::default().fg(Color::Red),
            ),
            Span::styled("  (r to retry)", Style::default().fg(Color::DarkGray)),
        ])],
        ExpansionState::Expanded(detail) => {
            let mut lines = Vec::new();

            let graph = detail.graph_image_url.as_deref().unwrap_or("none");
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{}graph ", DETAIL_INDENT),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(graph.to_string(), Style::default().fg(Color::Cyan).underlined()),
            ]));

            if let Some(ref notice) = detail.notice {
                lines.push(Line::from(Span::styled(
                    format!("{}! {}", DETAIL_INDENT, notice),
                    Style::default().fg(Color::Yellow),
                )));
            }

            let reasons = reason_views(detail);
            if reasons.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("{}no reasons recorded", DETAIL_INDENT),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.extend(reasons.iter().map(|r| reason_line(r, inspect)));
            lines
        }
    }
}

/// One reason: badge, sender, short form (or full text), date
fn reason_line(reason: &ReasonView, inspect: bool) -> Line<'static> {
    let badge_style = if reason.action.is_plus_plus() {
        Style::default().fg(Color::Black).bg(Color::Green).bold()
    } else {
        Style::default().fg(Color::Black).bg(Color::Red).bold()
    };

    let mut spans = vec![
        Span::raw(DETAIL_INDENT),
        Span::styled(reason.action.as_str().to_string(), badge_style),
        Span::styled("'ed by ", Style::default().fg(Color::DarkGray)),
        Span::styled(reason.sender.clone(), Style::default().fg(Color::White).bold()),
    ];

    let text = if inspect {
        Some(reason.full_text.clone())
    } else {
        reason.short_text.clone()
    };
    if let Some(text) = text {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(text, Style::default().fg(Color::Gray)));
    }

    spans.push(Span::styled(
        format!(" on {}", reason.date),
        Style::default().fg(Color::DarkGray),
    ));
    Line::from(spans)
}

/// Largest useful scroll position for a detail block of `total` lines
/// shown in at most `max_lines`
pub fn detail_scroll_limit(total: usize, max_lines: usize) -> usize {
    if total <= max_lines || max_lines == 0 {
        0
    } else {
        total - (max_lines - 1)
    }
}

/// Detail lines that fit in `max_lines`, starting at line `scroll`.
///
/// A clipped block gives its last line to a position marker, so the row
/// never needs more than `max_lines` below its name.
pub fn visible_detail_lines(
    row: &RowView,
    inspect: bool,
    max_lines: usize,
    scroll: usize,
) -> Vec<Line<'static>> {
    let lines = detail_lines(row, inspect);
    let total = lines.len();
    if total <= max_lines {
        return lines;
    }
    if max_lines == 0 {
        return Vec::new();
    }

    let window = max_lines - 1;
    let start = scroll.min(total - window);
    let mut visible: Vec<Line<'static>> = lines.into_iter().skip(start).take(window).collect();
    visible.push(Line::from(Span::styled(
        format!(
            "{}··· lines {}-{} of {} (J/K to scroll)",
            DETAIL_INDENT,
            start + 1,
            start + window,
            total
        ),
        Style::default().fg(Color::DarkGray).italic(),
    )));
    visible
}

/// Height of a row including its detail block, capped at `max_detail`
/// detail lines
pub fn row_height(row: &RowView, inspect: bool, max_detail: usize) -> u16 {
    1 + detail_lines(row, inspect).len().min(max_detail) as u16
}

/// Draw the score table
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.table.view();

    let block = Block::default()
        .title(format!(" #{} ", view.channel))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    if view.rows.is_empty() {
        let inner_area = block.inner(area);
        frame.render_widget(block, area);
        let empty = Paragraph::new("No targets in this channel yet")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, inner_area);
        return;
    }

    let name_width = area.width.saturating_sub(SCORE_WIDTH + 3) as usize;
    // Body is the inner area minus the header row; an open row must fit
    // in it together with its name line
    let body_height = block.inner(area).height.saturating_sub(1) as usize;
    let max_detail = body_height
        .saturating_sub(1)
        .min(app.max_detail_lines());

    let header = Row::new(vec![
        Cell::from(view.headers.name.clone()),
        Cell::from(Text::from(view.headers.score.clone()).alignment(Alignment::Right)),
    ])
    .style(Style::default().fg(Color::Yellow).bold());

    let rows: Vec<Row> = view
        .rows
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .map(|(idx, row)| {
            let is_selected = idx == app.selected_index;

            let marker = if row.entry.open { "▾ " } else { "▸ " };
            let mut name_lines = vec![Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::DarkGray)),
                Span::styled(
                    truncate_str(&row.name, name_width.saturating_sub(2)),
                    if is_selected {
                        Style::default().fg(Color::White).bold()
                    } else {
                        Style::default().fg(Color::White)
                    },
                ),
            ])];
            let scroll = if is_selected { app.detail_scroll } else { 0 };
            name_lines.extend(visible_detail_lines(row, app.inspect, max_detail, scroll));
            let height = name_lines.len() as u16;

            let score_style = if row.score > 0 {
                Style::default().fg(Color::Green)
            } else if row.score < 0 {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Gray)
            };

            let style = if is_selected {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(Text::from(name_lines)),
                Cell::from(
                    Text::from(Span::styled(row.score.to_string(), score_style))
                        .alignment(Alignment::Right),
                ),
            ])
            .height(height)
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Fill(1), Constraint::Length(SCORE_WIDTH)],
    )
    .header(header)
    .column_spacing(1)
    .block(block);

    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::RowEntry;
    use crate::model::{Action, Reason, TargetDetail, TargetKey};

    fn row(entry: RowEntry) -> RowView {
        RowView {
            key: TargetKey::new("dev", "bob"),
            name: "bob".into(),
            score: 2,
            entry,
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn detail() -> TargetDetail {
        TargetDetail {
            target: "bob".into(),
            reasons: vec![
                Reason {
                    action: Action::PlusPlus,
                    sender: "alice".into(),
                    reason_text: "bob++ for helping".into(),
                    timestamp_msec: 1_700_000_000_000,
                },
                Reason {
                    action: Action::MinusMinus,
                    sender: "carol".into(),
                    reason_text: "bob--".into(),
                    timestamp_msec: 1_700_000_000_000,
                },
            ],
            graph_image_url: Some("http://chart/bob.png".into()),
            notice: None,
        }
    }

    #[test]
    fn test_closed_row_has_no_detail() {
        let r = row(RowEntry {
            state: ExpansionState::Expanded(detail()),
            open: false,
        });
        assert!(detail_lines(&r, false).is_empty());
        assert_eq!(row_height(&r, false, 10), 1);
    }

    #[test]
    fn test_loading_and_failed_rows() {
        let loading = row(RowEntry {
            state: ExpansionState::Loading,
            open: true,
        });
        let lines = detail_lines(&loading, false);
        assert_eq!(lines.len(), 1);
        assert!(line_text(&lines[0]).contains("loading"));

        let failed = row(RowEntry {
            state: ExpansionState::Failed("request failed: refused".into()),
            open: true,
        });
        let text = line_text(&detail_lines(&failed, false)[0]);
        assert!(text.contains("refused"));
        assert!(text.contains("r to retry"));
    }

    #[test]
    fn test_expanded_row_lines() {
        let r = row(RowEntry {
            state: ExpansionState::Expanded(detail()),
            open: true,
        });
        let lines: Vec<String> = detail_lines(&r, false).iter().map(line_text).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("http://chart/bob.png"));
        assert!(lines[1].contains("++'ed by alice for helping on "));
        // No short form: sender then date
        assert!(lines[2].contains("--'ed by carol on "));
        assert_eq!(row_height(&r, false, 10), 4);
        assert_eq!(row_height(&r, false, 2), 3);
    }

    #[test]
    fn test_inspect_shows_full_text() {
        let r = row(RowEntry {
            state: ExpansionState::Expanded(detail()),
            open: true,
        });
        let lines: Vec<String> = detail_lines(&r, true).iter().map(line_text).collect();
        assert!(lines[1].contains("alice bob++ for helping on "));
        assert!(lines[2].contains("carol bob-- on "));
    }

    #[test]
    fn test_notice_and_empty_reasons() {
        let r = row(RowEntry {
            state: ExpansionState::Expanded(TargetDetail::empty("bob", "malformed response: x")),
            open: true,
        });
        let lines: Vec<String> = detail_lines(&r, false).iter().map(line_text).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("graph none"));
        assert!(lines[1].contains("malformed response"));
        assert!(lines[2].contains("no reasons recorded"));
    }

    fn long_detail(count: usize) -> TargetDetail {
        let reasons = (0..count)
            .map(|i| Reason {
                action: Action::PlusPlus,
                sender: format!("user{}", i),
                reason_text: format!("bob++ reason {}", i),
                timestamp_msec: 1_700_000_000_000,
            })
            .collect();
        TargetDetail {
            target: "bob".into(),
            reasons,
            graph_image_url: None,
            notice: None,
        }
    }

    #[test]
    fn test_visible_detail_lines_clip_with_marker() {
        let r = row(RowEntry {
            state: ExpansionState::Expanded(long_detail(20)),
            open: true,
        });
        // graph line + 20 reasons
        assert_eq!(detail_lines(&r, false).len(), 21);

        let lines: Vec<String> = visible_detail_lines(&r, false, 5, 0)
            .iter()
            .map(line_text)
            .collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("graph none"));
        assert!(lines[3].contains("user2"));
        assert!(lines[4].contains("lines 1-4 of 21"));
        assert_eq!(row_height(&r, false, 5), 6);
    }

    #[test]
    fn test_visible_detail_lines_scroll_clamped() {
        let r = row(RowEntry {
            state: ExpansionState::Expanded(long_detail(20)),
            open: true,
        });
        assert_eq!(detail_scroll_limit(21, 5), 17);
        assert_eq!(detail_scroll_limit(3, 5), 0);

        let lines: Vec<String> = visible_detail_lines(&r, false, 5, 100)
            .iter()
            .map(line_text)
            .collect();
        assert!(lines[3].contains("user19"));
        assert!(lines[4].contains("lines 18-21 of 21"));
    }

    #[test]
    fn test_unknown_action_badge_shows_raw_text() {
        let mut detail = detail();
        detail.reasons[0].action = Action::from("+=".to_string());
        detail.reasons[0].reason_text = "bob+= 2 for lunch".into();
        let r = row(RowEntry {
            state: ExpansionState::Expanded(detail),
            open: true,
        });
        let lines: Vec<String> = detail_lines(&r, false).iter().map(line_text).collect();
        assert!(lines[1].contains("+='ed by alice 2 for lunch on "));
    }
}
