//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives narration.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `navigation`: Section, contents and bookmark navigation plus preferences
//! - `playback`: Narration control and clipboard copy
//! - `narration_events`: Narrator event listener

mod input;
mod navigation;
mod playback;
mod narration_events;

use std::sync::Arc;
use arboard::Clipboard;
use tokio::sync::Mutex;

use crate::model::AppModel;
use crate::narration::Narrator;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) narrator: Arc<dyn Narrator>,
    /// Created on first copy; on X11 the contents live only as long as this handle
    clipboard: Arc<std::sync::Mutex<Option<Clipboard>>>,
    event_listener_started: Arc<Mutex<bool>>,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, narrator: Arc<dyn Narrator>) -> Self {
        Self {
            model,
            narrator,
            clipboard: Arc::new(std::sync::Mutex::new(None)),
            event_listener_started: Arc::new(Mutex::new(false)),
        }
    }

    /// Start forwarding narrator events into the model, once
    pub async fn start_event_listener(&self) {
        let mut started = self.event_listener_started.lock().await;
        if *started {
            return;
        }

        match self.narrator.take_event_channel() {
            Some(event_channel) => {
                *started = true;
                drop(started);
                self.spawn_narration_listener(event_channel);
            }
            None => tracing::warn!("Narrator event channel already taken"),
        }
    }
}
