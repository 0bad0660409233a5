//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core UI type definitions (panes, status messages, etc.)
//! - `content`: The read-only book tree and narration/copy text extraction
//! - `navigation`: Active section resolution and previous/next traversal
//! - `settings`: Font size, theme and bookmarks over a key-value store
//! - `playback`: Narration playback state machine
//! - `app_model`: Main application model with state management methods

mod types;
mod content;
mod navigation;
mod settings;
mod playback;
mod app_model;

// Re-export all public types for convenient access
pub use types::{ActivePane, StatusKind, UiState};

pub use content::{Book, ContentBlock, Section};

pub use navigation::Location;

pub use settings::{FileStore, KeyValueStore, MemoryStore, Settings};

pub use playback::{PlaybackInfo, PlaybackState};

pub use app_model::AppModel;
