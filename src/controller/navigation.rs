//! Navigation-related controller methods (sections, contents, bookmarks, preferences)

use crate::model::StatusKind;
use super::AppController;

impl AppController {
    pub async fn next_section(&self) {
        let mut model = self.model.lock().await;
        model.go_next(self.narrator.as_ref());
    }

    pub async fn previous_section(&self) {
        let mut model = self.model.lock().await;
        model.go_previous(self.narrator.as_ref());
    }

    pub async fn show_table_of_contents(&self) {
        let mut model = self.model.lock().await;
        model.show_table_of_contents(self.narrator.as_ref());
    }

    pub async fn open_contents_entry(&self) {
        let mut model = self.model.lock().await;
        model.open_selected_contents_entry(self.narrator.as_ref());
    }

    pub async fn open_bookmark(&self) {
        let mut model = self.model.lock().await;
        model.open_selected_bookmark(self.narrator.as_ref());
    }

    pub async fn toggle_bookmark(&self) {
        let mut model = self.model.lock().await;
        match model.toggle_current_bookmark() {
            Some(true) => model.set_status("Bookmarked".to_string(), StatusKind::Info),
            Some(false) => model.set_status("Bookmark removed".to_string(), StatusKind::Info),
            None => tracing::debug!("Bookmark toggle ignored on table of contents"),
        }
    }

    pub async fn increase_font(&self) {
        let mut model = self.model.lock().await;
        model.increase_font();
        tracing::debug!(level = model.settings().font_size(), "Font size increased");
    }

    pub async fn decrease_font(&self) {
        let mut model = self.model.lock().await;
        model.decrease_font();
        tracing::debug!(level = model.settings().font_size(), "Font size decreased");
    }

    pub async fn toggle_theme(&self) {
        let mut model = self.model.lock().await;
        model.toggle_theme();
        tracing::debug!(dark_mode = model.settings().dark_mode(), "Theme toggled");
    }
}
