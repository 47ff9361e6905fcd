//! UI rendering for the TUI

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::app::App;
use super::views::score_table;

/// Screen regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub header: Rect,
    pub table: Rect,
    pub footer: Rect,
}

/// Split the screen: header line, table, footer line.
///
/// Shared by drawing and mouse hit testing so both agree on where the
/// table is.
pub fn layout(area: Rect) -> AppLayout {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(3),    // Table
        Constraint::Length(1), // Footer/status
    ])
    .split(area);

    AppLayout {
        header: chunks[0],
        table: chunks[1],
        footer: chunks[2],
    }
}

/// Area inside the table block's borders
pub fn table_inner(table: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(table)
}

/// Main draw function - orchestrates all rendering
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let regions = layout(area);

    draw_header(frame, app, regions.header);
    score_table::draw(frame, app, regions.table);
    draw_footer(frame, app, regions.footer);

    if app.show_help {
        draw_help_overlay(frame, area);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.table.view();
    let loading = app.table.details().loading_count();

    let loading_indicator = if loading > 0 {
        format!(" [loading {}]", loading)
    } else {
        String::new()
    };

    let header_text = format!(
        " Scoreboard │ #{} │ [{} targets] │ {}{}",
        view.channel,
        view.rows.len(),
        app.source_label,
        loading_indicator
    );

    let header =
        Paragraph::new(header_text).style(Style::default().bg(Color::Blue).fg(Color::White).bold());

    frame.render_widget(header, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let keybinds = "j/k:move  Enter:expand  n:sort name  s:sort score  r:retry  i:inspect  ?:help  q:quit";

    // Show status message if present, otherwise show keybinds
    let footer_text = if let Some((ref msg, _)) = app.status_message {
        msg.clone()
    } else {
        keybinds.to_string()
    };

    let footer = Paragraph::new(format!(" {}", footer_text))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(footer, area);
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    // Center the help popup
    let popup_width = 56.min(area.width.saturating_sub(4));
    let popup_height = 24.min(area.height.saturating_sub(4));

    let popup_area = Rect {
        x: (area.width - popup_width) / 2,
        y: (area.height - popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let help_text = r#"
  Score Table
  ─────────────────────────────────
  j/k, ↑/↓     Move up/down
  g / G        Jump to top / bottom
  Ctrl+d/u     Page down/up
  n            Sort by name (again: reverse)
  s            Sort by score (again: reverse)
  Enter/Space  Expand/collapse reasons
  J / K        Scroll a long reason list
  r            Retry a failed row
  i            Full reason text on/off
  q            Quit

  Mouse
  ─────────────────────────────────
  Click header Sort by that column
  Click row    Expand/collapse
  Wheel        Move selection

  Press ? or Esc to close
"#;

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(help, popup_area);
}
