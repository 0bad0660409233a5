//! Narrator event listener

use crate::narration::{NarrationEvent, NarrationEventChannel};
use super::AppController;

impl AppController {
    pub(crate) fn spawn_narration_listener(&self, mut event_channel: NarrationEventChannel) {
        let model = self.model.clone();
        tracing::info!("Starting narration event listener");

        tokio::spawn(async move {
            while let Some(event) = event_channel.recv().await {
                let mut model_guard = model.lock().await;

                if model_guard.should_quit() {
                    tracing::debug!("Narration event listener shutting down");
                    break;
                }

                match &event {
                    NarrationEvent::Boundary { id, char_index } => {
                        tracing::trace!(id, char_index, "NarrationEvent::Boundary");
                    }
                    NarrationEvent::Finished { id } => {
                        tracing::debug!(id, "NarrationEvent::Finished");
                    }
                    NarrationEvent::Failed { id, cause } => {
                        tracing::debug!(id, %cause, "NarrationEvent::Failed");
                    }
                }
                model_guard.handle_narration_event(&event);
            }
        });
    }
}
