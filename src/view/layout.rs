//! Layout rendering (header bar, sidebar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::{ActivePane, AppModel, Location};
use super::utils::{render_scrollable_list, truncate_string, Palette};

pub fn render_header(frame: &mut Frame, area: Rect, model: &AppModel, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Book title + position
            Constraint::Length(30), // Indicators
        ])
        .split(area);

    let resolved = model.resolved();
    let position = match (&resolved.active, &resolved.position) {
        (Some(section), Some(position)) => format!(
            "{} · {} ({}/{})",
            position.chapter_title,
            section.title,
            position.index + 1,
            position.sibling_count
        ),
        _ => "Table of Contents".to_string(),
    };

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            model.book().title.clone(),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(position, Style::default().fg(palette.text)),
    ]))
    .style(palette.base())
    .block(Block::default().borders(Borders::ALL).padding(Padding::horizontal(1)));
    frame.render_widget(title, chunks[0]);

    let settings = model.settings();
    let bookmark = if model.is_current_bookmarked() { "★" } else { "☆" };
    let theme = if settings.dark_mode() { "Dark" } else { "Light" };
    let indicators = Paragraph::new(format!(
        "{} {} | {}",
        bookmark,
        settings.font_size_label(),
        theme
    ))
    .style(palette.base().fg(palette.muted))
    .block(Block::default().borders(Borders::ALL).title(" View "));
    frame.render_widget(indicators, chunks[1]);
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, model: &AppModel, palette: &Palette) {
    let bookmark_entries = model.bookmark_entries();
    let bookmarks_height = (bookmark_entries.len() as u16 + 2).max(3).min(area.height / 2);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),                   // Contents
            Constraint::Length(bookmarks_height), // Bookmarks
        ])
        .split(area);

    let ui_state = model.ui_state();
    let max_width = area.width.saturating_sub(6) as usize;
    let current_id = match model.location() {
        Location::Section(id) => Some(id.as_str()),
        Location::TableOfContents => None,
    };

    // Contents: chapter headings interleaved with selectable sections
    let mut items = Vec::new();
    let mut selected_row = None;
    let mut section_index = 0;
    for chapter in &model.book().chapters {
        items.push(ListItem::new(truncate_string(&chapter.title, max_width)).style(
            Style::default().fg(palette.muted).add_modifier(Modifier::BOLD),
        ));
        for section in &chapter.sections {
            let is_selected = section_index == ui_state.contents_selected;
            let is_current = current_id == Some(section.id.as_str());
            let style = if is_selected && ui_state.active_pane == ActivePane::Contents {
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
            } else if is_current {
                Style::default().fg(palette.text).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.text)
            };
            if is_selected {
                selected_row = Some(items.len());
            }
            let marker = if is_current { "▸ " } else { "  " };
            items.push(
                ListItem::new(format!("{}{}", marker, truncate_string(&section.title, max_width)))
                    .style(style),
            );
            section_index += 1;
        }
    }

    render_scrollable_list(
        frame,
        chunks[0],
        items,
        selected_row,
        pane_block(" Contents ", ui_state.active_pane == ActivePane::Contents, palette),
    );

    let bookmark_items: Vec<ListItem> = if bookmark_entries.is_empty() {
        vec![ListItem::new("No bookmarks").style(Style::default().fg(palette.muted))]
    } else {
        bookmark_entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if i == ui_state.bookmarks_selected
                    && ui_state.active_pane == ActivePane::Bookmarks
                {
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.text)
                };
                ListItem::new(truncate_string(&entry.title, max_width)).style(style)
            })
            .collect()
    };

    let selected_bookmark = (!bookmark_entries.is_empty()).then_some(ui_state.bookmarks_selected);
    render_scrollable_list(
        frame,
        chunks[1],
        bookmark_items,
        selected_bookmark,
        pane_block(" Bookmarks ", ui_state.active_pane == ActivePane::Bookmarks, palette),
    );
}

pub fn pane_block<'a>(title: &'a str, focused: bool, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .style(palette.base())
        .border_style(if focused {
            Style::default().fg(palette.accent)
        } else {
            Style::default().fg(palette.muted)
        })
}
