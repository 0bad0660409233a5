//! Audio player bar rendering

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{PlaybackInfo, PlaybackState};
use super::utils::Palette;

pub fn status_text(playback: &PlaybackInfo) -> String {
    match (playback.state, &playback.section_title) {
        (PlaybackState::Playing, Some(title)) => format!(" ▶ {}", title),
        (PlaybackState::Paused, Some(title)) => format!(" ⏸ {}", title),
        (PlaybackState::Idle, _) if playback.progress == 100 => " ✓ Finished".to_string(),
        _ => " ■ Stopped".to_string(),
    }
}

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo, palette: &Palette) {
    let controls_info = " Space: play/pause | s: stop | a: hide ";

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text(playback)))
                .title_bottom(Line::from(controls_info).right_aligned())
                .style(palette.base()),
        )
        .gauge_style(Style::default().fg(palette.accent).bg(palette.background))
        .percent(u16::from(playback.progress.min(100)))
        .label(format!("{}%", playback.progress));

    frame.render_widget(gauge, area);
}
