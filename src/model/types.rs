//! Core UI type definitions

use std::time::{Duration, Instant};

/// How long a status message stays on screen
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Which pane of the UI has keyboard focus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ActivePane {
    Contents,
    Bookmarks,
    #[default]
    Reader,
}

impl ActivePane {
    pub fn next(self) -> Self {
        match self {
            ActivePane::Contents => ActivePane::Bookmarks,
            ActivePane::Bookmarks => ActivePane::Reader,
            ActivePane::Reader => ActivePane::Contents,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActivePane::Contents => ActivePane::Reader,
            ActivePane::Bookmarks => ActivePane::Contents,
            ActivePane::Reader => ActivePane::Bookmarks,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Transient message shown over the reader (copy confirmation, narration errors)
#[derive(Clone, Debug)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub shown_at: Instant,
}

impl StatusMessage {
    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= STATUS_TIMEOUT
    }
}

/// A bookmark as displayed in the sidebar
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookmarkEntry {
    pub section_id: String,
    pub title: String,
    pub chapter_title: String,
}

/// UI state for the application
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub active_pane: ActivePane,
    /// Index into the flattened section list
    pub contents_selected: usize,
    pub bookmarks_selected: usize,
    pub scroll: u16,
    pub show_player: bool,
    pub show_help_popup: bool,
    pub status: Option<StatusMessage>,
}
