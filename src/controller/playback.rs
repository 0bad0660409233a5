//! Playback control methods

use arboard::Clipboard;

use crate::model::StatusKind;
use super::AppController;

impl AppController {
    pub async fn toggle_playback(&self) {
        let mut model = self.model.lock().await;
        tracing::debug!(state = ?model.playback_state(), "Toggling playback");
        model.toggle_playback(self.narrator.as_ref());
    }

    pub async fn stop_playback(&self) {
        let mut model = self.model.lock().await;
        tracing::debug!(state = ?model.playback_state(), "Stopping playback");
        model.stop_playback(self.narrator.as_ref());
    }

    pub async fn toggle_player(&self) {
        let mut model = self.model.lock().await;
        model.toggle_player();
    }

    /// Copy the displayed section as plain text. Failures are only logged;
    /// the confirmation simply does not appear.
    pub async fn copy_section_text(&self) {
        let mut model = self.model.lock().await;
        let Some(text) = model.active_section().map(|section| section.plain_text()) else {
            tracing::debug!("Nothing to copy on the table of contents");
            return;
        };

        match self.write_clipboard(text) {
            Ok(()) => {
                tracing::info!("Section text copied to clipboard");
                model.set_status("Copied to clipboard".to_string(), StatusKind::Info);
            }
            Err(e) => tracing::error!(error = %e, "Clipboard write failed"),
        }
    }

    fn write_clipboard(&self, text: String) -> anyhow::Result<()> {
        let mut slot = self
            .clipboard
            .lock()
            .map_err(|_| anyhow::anyhow!("clipboard handle poisoned"))?;
        if slot.is_none() {
            *slot = Some(Clipboard::new()?);
        }
        if let Some(clipboard) = slot.as_mut() {
            clipboard.set_text(text)?;
        }
        Ok(())
    }
}
