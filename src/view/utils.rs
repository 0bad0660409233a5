//! Utility functions for rendering UI components

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, List, ListItem, ListState},
    Frame,
};

/// Colors for one theme
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub quote: Color,
}

impl Palette {
    pub fn for_theme(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                background: Color::Black,
                text: Color::Gray,
                muted: Color::DarkGray,
                accent: Color::Green,
                quote: Color::Cyan,
            }
        } else {
            Self {
                background: Color::White,
                text: Color::Black,
                muted: Color::DarkGray,
                accent: Color::Blue,
                quote: Color::Magenta,
            }
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }
}

/// Reading column geometry for a font-size level: larger levels read as
/// a narrower column with more air between blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextMetrics {
    /// Percentage of the content area used by the text column
    pub column_percent: u16,
    /// Blank lines between blocks
    pub block_spacing: usize,
}

pub fn text_metrics(font_level: usize) -> TextMetrics {
    match font_level {
        0 => TextMetrics { column_percent: 100, block_spacing: 0 },
        1 => TextMetrics { column_percent: 90, block_spacing: 1 },
        2 => TextMetrics { column_percent: 80, block_spacing: 1 },
        3 => TextMetrics { column_percent: 70, block_spacing: 2 },
        _ => TextMetrics { column_percent: 60, block_spacing: 2 },
    }
}

/// Center a column of `percent` width inside `area`
pub fn centered_column(area: Rect, percent: u16) -> Rect {
    let width = (area.width as u32 * percent.min(100) as u32 / 100) as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height: area.height,
    }
}

pub fn render_scrollable_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    selected_index: Option<usize>,
    block: Block,
) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(selected_index);

    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}
