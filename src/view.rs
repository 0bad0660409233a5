//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Theme palette, reading column metrics, scrollable lists
//! - `layout`: Main layout structure (header, sidebar)
//! - `content`: Reader pane (section body or table of contents)
//! - `progress`: Narration player bar
//! - `overlays`: Status notification and help popup

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::AppModel;
use utils::Palette;

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, model: &AppModel) {
        let ui_state = model.ui_state();
        let palette = Palette::for_theme(model.settings().dark_mode());

        let player_height = if ui_state.show_player { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),             // Header
                Constraint::Min(0),                // Sidebar + reader
                Constraint::Length(player_height), // Player bar
            ])
            .split(frame.area());

        layout::render_header(frame, chunks[0], model, &palette);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Contents + bookmarks
                Constraint::Percentage(70), // Reader
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], model, &palette);
        content::render_main_content(frame, main_chunks[1], model, &palette);

        if ui_state.show_player {
            progress::render_progress_bar(frame, chunks[2], &model.playback_info(), &palette);
        }

        if ui_state.status.is_some() {
            overlays::render_status(frame, ui_state, &palette);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame, &palette);
        }
    }
}
