//! Main reading pane: the active section body or the table of contents

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::model::{ActivePane, AppModel, ContentBlock, Section};
use super::layout::pane_block;
use super::utils::{centered_column, text_metrics, Palette};

pub fn render_main_content(frame: &mut Frame, area: Rect, model: &AppModel, palette: &Palette) {
    let ui_state = model.ui_state();
    let focused = ui_state.active_pane == ActivePane::Reader;
    let metrics = text_metrics(model.settings().font_size());

    let (title, lines) = match model.active_section() {
        Some(section) => (" Reader ", section_lines(section, metrics.block_spacing, palette)),
        None => (" Table of Contents ", toc_lines(model, palette)),
    };

    let block = pane_block(title, focused, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let column = centered_column(inner, metrics.column_percent);
    let paragraph = Paragraph::new(lines)
        .style(palette.base())
        .wrap(Wrap { trim: false })
        .scroll((ui_state.scroll, 0));
    frame.render_widget(paragraph, column);
}

fn section_lines<'a>(section: &'a Section, spacing: usize, palette: &Palette) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::styled(
            section.title.as_str(),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];

    for block in &section.blocks {
        match block {
            ContentBlock::Plain(text) => {
                lines.push(Line::from(Span::styled(text.as_str(), Style::default().fg(palette.text))));
            }
            ContentBlock::Header { text } => {
                lines.push(Line::from(Span::styled(
                    text.as_str(),
                    Style::default().fg(palette.text).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                )));
            }
            ContentBlock::List { items } => {
                for item in items {
                    lines.push(Line::from(vec![
                        Span::styled("  • ", Style::default().fg(palette.accent)),
                        Span::styled(item.as_str(), Style::default().fg(palette.text)),
                    ]));
                }
            }
            ContentBlock::Quote { text, source } => {
                lines.push(Line::from(vec![
                    Span::styled("┃ ", Style::default().fg(palette.quote)),
                    Span::styled(
                        text.as_str(),
                        Style::default().fg(palette.quote).add_modifier(Modifier::ITALIC),
                    ),
                ]));
                if let Some(source) = source {
                    lines.push(Line::from(Span::styled(
                        format!("  -- {}", source),
                        Style::default().fg(palette.muted),
                    )));
                }
            }
            ContentBlock::Footnote { text } => {
                lines.push(Line::from(Span::styled(
                    format!("† {}", text),
                    Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
                )));
            }
        }
        lines.extend(std::iter::repeat_with(Line::default).take(spacing));
    }
    lines
}

fn toc_lines<'a>(model: &'a AppModel, palette: &Palette) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    for (index, chapter) in model.book().chapters.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("{}. {}", index + 1, chapter.title),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        )));
        for section in &chapter.sections {
            let marker = if model.settings().is_bookmarked(&section.id) { "★" } else { " " };
            lines.push(Line::from(vec![
                Span::styled(format!("  {} ", marker), Style::default().fg(palette.accent)),
                Span::styled(section.title.as_str(), Style::default().fg(palette.text)),
            ]));
        }
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        "Press Enter or → to start reading",
        Style::default().fg(palette.muted),
    )));
    lines
}
