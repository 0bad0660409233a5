//! Overlay rendering (status notification, help popup)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::model::{StatusKind, UiState};
use super::utils::Palette;

pub fn render_status(frame: &mut Frame, ui_state: &UiState, palette: &Palette) {
    let Some(ref status) = ui_state.status else {
        return;
    };
    let area = frame.area();

    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4).max(1) as usize;

    let line_count = status.text.chars().count().div_ceil(inner_width) as u16;
    let popup_height = (2 + line_count.max(1)).min(area.height.saturating_sub(4));

    // Pinned above the player bar
    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height + 4),
        width: popup_width,
        height: popup_height,
    };

    let (color, title) = match status.kind {
        StatusKind::Info => (palette.accent, " Info "),
        StatusKind::Error => (Color::Red, " Error (Esc to dismiss) "),
    };

    frame.render_widget(Clear, popup_area);

    let widget = Paragraph::new(status.text.as_str())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title)
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(palette.background)),
        );

    frame.render_widget(widget, popup_area);
}

pub fn render_help_popup(frame: &mut Frame, palette: &Palette) {
    let area = frame.area();

    let keybindings = [
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle panes"),
        ("↑ / ↓", "Move selection / scroll"),
        ("Enter", "Open entry"),
        ("← / →", "Previous / next section"),
        ("T", "Table of contents"),
        ("", ""),
        ("", "── Reading ──"),
        ("B", "Toggle bookmark"),
        ("+ / -", "Font size up / down"),
        ("D", "Toggle dark mode"),
        ("C", "Copy section text"),
        ("", ""),
        ("", "── Narration ──"),
        ("Space", "Play / Pause"),
        ("S", "Stop"),
        ("A", "Show / hide player"),
        ("", ""),
        ("", "── General ──"),
        ("H", "Toggle this help"),
        ("Q", "Quit"),
    ];

    let popup_width = 56.min(area.width);
    let popup_height = (keybindings.len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(palette.quote).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(palette.text)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title(" Help (H or Esc to close) ")
            .title_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
            .style(palette.base()),
    );

    frame.render_widget(help_text, popup_area);
}
