//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::ActivePane;
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let mut model = self.model.lock().await;

        // Handle help popup
        if model.is_help_popup_open() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.hide_help_popup();
            }
            return Ok(());
        }

        if key.code == KeyCode::Esc && model.ui_state().status.is_some() {
            model.clear_status();
            return Ok(());
        }

        let active_pane = model.ui_state().active_pane;

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true);
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                model.set_should_quit(true);
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    model.cycle_pane_backward();
                } else {
                    model.cycle_pane_forward();
                }
            }
            KeyCode::BackTab => {
                model.cycle_pane_backward();
            }
            KeyCode::Up => {
                model.move_selection_up();
            }
            KeyCode::Down => {
                model.move_selection_down();
            }
            KeyCode::Enter => {
                drop(model);
                match active_pane {
                    ActivePane::Contents => self.open_contents_entry().await,
                    ActivePane::Bookmarks => self.open_bookmark().await,
                    // Enter on the TOC opens the first section
                    ActivePane::Reader => self.next_section_from_toc().await,
                }
            }
            // Previous / next section
            KeyCode::Left => {
                drop(model);
                self.previous_section().await;
            }
            KeyCode::Right => {
                drop(model);
                self.next_section().await;
            }
            // Table of contents
            KeyCode::Char('t') | KeyCode::Char('T') => {
                drop(model);
                self.show_table_of_contents().await;
            }
            // Bookmark current section
            KeyCode::Char('b') | KeyCode::Char('B') => {
                drop(model);
                self.toggle_bookmark().await;
            }
            // Font size
            KeyCode::Char('+') | KeyCode::Char('=') => {
                drop(model);
                self.increase_font().await;
            }
            KeyCode::Char('-') => {
                drop(model);
                self.decrease_font().await;
            }
            // Dark mode
            KeyCode::Char('d') | KeyCode::Char('D') => {
                drop(model);
                self.toggle_theme().await;
            }
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            // Stop narration
            KeyCode::Char('s') | KeyCode::Char('S') => {
                drop(model);
                self.stop_playback().await;
            }
            // Show/hide audio player
            KeyCode::Char('a') | KeyCode::Char('A') => {
                drop(model);
                self.toggle_player().await;
            }
            // Copy section text
            KeyCode::Char('c') | KeyCode::Char('C') => {
                drop(model);
                self.copy_section_text().await;
            }
            // Show help popup
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help_popup();
            }
            _ => {}
        }
        Ok(())
    }

    async fn next_section_from_toc(&self) {
        let on_toc = self.model.lock().await.active_section().is_none();
        if on_toc {
            self.next_section().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tokio::sync::Mutex;

    use crate::controller::AppController;
    use crate::model::{AppModel, Book, Location, MemoryStore, PlaybackState, Settings};
    use crate::narration::{Narrator, PacedNarrator, SpeechParams};

    fn controller() -> AppController {
        let book = Book::embedded().unwrap();
        let settings = Settings::load(Box::new(MemoryStore::new()));
        let model = Arc::new(Mutex::new(AppModel::new(book, settings, SpeechParams::default())));
        let narrator: Arc<dyn Narrator> = Arc::new(PacedNarrator::silent());
        AppController::new(model, narrator)
    }

    async fn press(controller: &AppController, code: KeyCode) {
        controller
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn enter_on_toc_opens_first_section() {
        let controller = controller();
        press(&controller, KeyCode::Enter).await;
        let model = controller.model.lock().await;
        assert_eq!(model.location(), &Location::Section("ch1-s1".to_string()));
    }

    #[tokio::test]
    async fn arrows_traverse_sections() {
        let controller = controller();
        press(&controller, KeyCode::Right).await;
        press(&controller, KeyCode::Right).await;
        press(&controller, KeyCode::Left).await;
        let model = controller.model.lock().await;
        assert_eq!(model.location(), &Location::Section("ch1-s1".to_string()));
    }

    #[tokio::test]
    async fn space_toggles_and_navigation_stops_narration() {
        let controller = controller();
        press(&controller, KeyCode::Right).await;
        press(&controller, KeyCode::Char(' ')).await;
        assert_eq!(controller.model.lock().await.playback_state(), PlaybackState::Playing);
        press(&controller, KeyCode::Char(' ')).await;
        assert_eq!(controller.model.lock().await.playback_state(), PlaybackState::Paused);

        press(&controller, KeyCode::Right).await;
        let model = controller.model.lock().await;
        assert_eq!(model.playback_state(), PlaybackState::Idle);
        assert!(!model.ui_state().show_player);
    }

    #[tokio::test]
    async fn preference_keys_update_settings() {
        let controller = controller();
        press(&controller, KeyCode::Char('+')).await;
        press(&controller, KeyCode::Char('+')).await;
        press(&controller, KeyCode::Char('+')).await;
        press(&controller, KeyCode::Char('d')).await;
        press(&controller, KeyCode::Right).await;
        press(&controller, KeyCode::Char('b')).await;

        let model = controller.model.lock().await;
        assert_eq!(model.settings().font_size(), 4);
        assert!(model.settings().dark_mode());
        assert!(model.is_current_bookmarked());
    }

    #[tokio::test]
    async fn help_popup_swallows_keys() {
        let controller = controller();
        press(&controller, KeyCode::Char('h')).await;
        press(&controller, KeyCode::Right).await;
        assert_eq!(controller.model.lock().await.location(), &Location::TableOfContents);
        press(&controller, KeyCode::Esc).await;
        assert!(!controller.model.lock().await.is_help_popup_open());
    }

    #[tokio::test]
    async fn q_quits() {
        let controller = controller();
        press(&controller, KeyCode::Char('q')).await;
        assert!(controller.model.lock().await.should_quit());
    }
}
