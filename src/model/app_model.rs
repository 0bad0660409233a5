//! Main application model with state management
//!
//! One owned value holds everything the reader knows: the book, where the
//! reader is, preferences, playback and UI state. The controller mutates it
//! through the methods below and the view renders it.

use std::time::Instant;

use crate::narration::{NarrationEvent, Narrator, SpeechParams};

use super::content::{Book, Section};
use super::navigation::{Location, Navigation, Resolved};
use super::playback::{PlaybackController, PlaybackInfo, PlaybackState};
use super::settings::Settings;
use super::types::{ActivePane, BookmarkEntry, StatusKind, StatusMessage, UiState};

pub struct AppModel {
    book: Book,
    location: Location,
    settings: Settings,
    playback: PlaybackController,
    ui_state: UiState,
    should_quit: bool,
}

impl AppModel {
    /// A fresh session opens on the table of contents
    pub fn new(book: Book, settings: Settings, speech: SpeechParams) -> Self {
        Self {
            book,
            location: Location::TableOfContents,
            settings,
            playback: PlaybackController::new(speech),
            ui_state: UiState::default(),
            should_quit: false,
        }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn resolved(&self) -> Resolved<'_> {
        Navigation::resolve(&self.book, &self.location)
    }

    pub fn active_section(&self) -> Option<&Section> {
        self.resolved().active
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui_state
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_should_quit(&mut self, quit: bool) {
        self.should_quit = quit;
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Show `location`. Any change of the displayed section stops narration
    /// and hides the player.
    pub fn navigate_to(&mut self, location: Location, narrator: &dyn Narrator) {
        let resolved_location = match Navigation::resolve(&self.book, &location).active {
            Some(section) => Location::Section(section.id.clone()),
            None => Location::TableOfContents,
        };
        if resolved_location == self.location {
            return;
        }

        self.playback.stop(narrator);
        self.ui_state.show_player = false;
        self.ui_state.scroll = 0;

        tracing::info!(from = %self.location, to = %resolved_location, "Navigating");
        self.location = resolved_location;

        if let Location::Section(id) = &self.location {
            if let Some(index) = self.book.sections().position(|s| s.id == *id) {
                self.ui_state.contents_selected = index;
            }
        }
    }

    pub fn go_next(&mut self, narrator: &dyn Narrator) {
        if let Some(next) = Navigation::next(&self.book, &self.location) {
            self.navigate_to(next, narrator);
        }
    }

    pub fn go_previous(&mut self, narrator: &dyn Narrator) {
        if let Some(previous) = Navigation::previous(&self.book, &self.location) {
            self.navigate_to(previous, narrator);
        }
    }

    pub fn show_table_of_contents(&mut self, narrator: &dyn Narrator) {
        self.navigate_to(Location::TableOfContents, narrator);
    }

    pub fn open_selected_contents_entry(&mut self, narrator: &dyn Narrator) {
        let target = self
            .book
            .sections()
            .nth(self.ui_state.contents_selected)
            .map(|section| Location::Section(section.id.clone()));
        if let Some(target) = target {
            self.navigate_to(target, narrator);
            self.ui_state.active_pane = ActivePane::Reader;
        }
    }

    pub fn open_selected_bookmark(&mut self, narrator: &dyn Narrator) {
        let target = self
            .bookmark_entries()
            .into_iter()
            .nth(self.ui_state.bookmarks_selected)
            .map(|entry| Location::from_id(&entry.section_id));
        if let Some(target) = target {
            self.navigate_to(target, narrator);
            self.ui_state.active_pane = ActivePane::Reader;
        }
    }

    // ========================================================================
    // Preferences & bookmarks
    // ========================================================================

    pub fn increase_font(&mut self) {
        self.settings.increase_font();
    }

    pub fn decrease_font(&mut self) {
        self.settings.decrease_font();
    }

    pub fn toggle_theme(&mut self) {
        self.settings.toggle_theme();
    }

    /// Toggle the bookmark on the displayed section; the TOC cannot be bookmarked
    pub fn toggle_current_bookmark(&mut self) -> Option<bool> {
        let id = match &self.location {
            Location::Section(id) => id.clone(),
            Location::TableOfContents => return None,
        };
        let bookmarked = self.settings.toggle_bookmark(&id);
        tracing::info!(section_id = %id, bookmarked, "Bookmark toggled");

        let count = self.bookmark_entries().len();
        if self.ui_state.bookmarks_selected >= count {
            self.ui_state.bookmarks_selected = count.saturating_sub(1);
        }
        Some(bookmarked)
    }

    pub fn is_current_bookmarked(&self) -> bool {
        match &self.location {
            Location::Section(id) => self.settings.is_bookmarked(id),
            Location::TableOfContents => false,
        }
    }

    /// Bookmarks in insertion order, skipping ids the book does not contain
    pub fn bookmark_entries(&self) -> Vec<BookmarkEntry> {
        self.settings
            .bookmarks()
            .iter()
            .filter_map(|id| {
                let (chapter_index, section_index) = self.book.locate(id)?;
                let chapter = &self.book.chapters[chapter_index];
                Some(BookmarkEntry {
                    section_id: id.clone(),
                    title: chapter.sections[section_index].title.clone(),
                    chapter_title: chapter.title.clone(),
                })
            })
            .collect()
    }

    // ========================================================================
    // Playback
    // ========================================================================

    pub fn playback_info(&self) -> PlaybackInfo {
        self.playback.info()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn toggle_playback(&mut self, narrator: &dyn Narrator) {
        let Location::Section(id) = &self.location else {
            tracing::debug!("Nothing to narrate on the table of contents");
            return;
        };
        let Some(section) = self.book.find_section(id) else {
            return;
        };

        self.ui_state.show_player = true;
        if let Err(e) = self.playback.toggle(section, narrator) {
            tracing::error!(error = %e, "Could not start narration");
            self.set_status(format!("Narration unavailable: {}", e), StatusKind::Error);
        }
    }

    pub fn stop_playback(&mut self, narrator: &dyn Narrator) {
        self.playback.stop(narrator);
    }

    pub fn toggle_player(&mut self) {
        self.ui_state.show_player = !self.ui_state.show_player;
    }

    pub fn handle_narration_event(&mut self, event: &NarrationEvent) {
        if let Some(cause) = self.playback.handle_event(event) {
            self.set_status(format!("Narration stopped: {}", cause), StatusKind::Error);
        }
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub fn cycle_pane_forward(&mut self) {
        self.ui_state.active_pane = self.ui_state.active_pane.next();
    }

    pub fn cycle_pane_backward(&mut self) {
        self.ui_state.active_pane = self.ui_state.active_pane.prev();
    }

    pub fn move_selection_up(&mut self) {
        let state = &mut self.ui_state;
        match state.active_pane {
            ActivePane::Contents => state.contents_selected = state.contents_selected.saturating_sub(1),
            ActivePane::Bookmarks => state.bookmarks_selected = state.bookmarks_selected.saturating_sub(1),
            ActivePane::Reader => state.scroll = state.scroll.saturating_sub(1),
        }
    }

    pub fn move_selection_down(&mut self) {
        let section_count = self.book.section_count();
        let bookmark_count = self.bookmark_entries().len();
        let state = &mut self.ui_state;
        match state.active_pane {
            ActivePane::Contents => {
                if state.contents_selected + 1 < section_count {
                    state.contents_selected += 1;
                }
            }
            ActivePane::Bookmarks => {
                if state.bookmarks_selected + 1 < bookmark_count {
                    state.bookmarks_selected += 1;
                }
            }
            ActivePane::Reader => state.scroll = state.scroll.saturating_add(1),
        }
    }

    pub fn show_help_popup(&mut self) {
        self.ui_state.show_help_popup = true;
    }

    pub fn hide_help_popup(&mut self) {
        self.ui_state.show_help_popup = false;
    }

    pub fn is_help_popup_open(&self) -> bool {
        self.ui_state.show_help_popup
    }

    pub fn set_status(&mut self, text: String, kind: StatusKind) {
        self.ui_state.status = Some(StatusMessage { text, kind, shown_at: Instant::now() });
    }

    pub fn clear_status(&mut self) {
        self.ui_state.status = None;
    }

    pub fn auto_clear_status(&mut self) {
        if self.ui_state.status.as_ref().is_some_and(StatusMessage::is_expired) {
            self.ui_state.status = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::content::tests::sample_book;
    use crate::model::playback::tests::RecordingNarrator;
    use crate::model::settings::{DEFAULT_FONT_SIZE, MemoryStore};
    use crate::model::types::STATUS_TIMEOUT;
    use std::time::Duration;

    fn model() -> AppModel {
        AppModel::new(
            sample_book(),
            Settings::load(Box::new(MemoryStore::new())),
            SpeechParams::default(),
        )
    }

    fn at(id: &str) -> Location {
        Location::Section(id.to_string())
    }

    #[test]
    fn fresh_session_defaults() {
        let model = model();
        assert_eq!(model.location(), &Location::TableOfContents);
        assert!(model.active_section().is_none());
        assert_eq!(model.settings().font_size(), DEFAULT_FONT_SIZE);
        assert!(!model.settings().dark_mode());
        assert!(model.bookmark_entries().is_empty());
        assert_eq!(model.playback_state(), PlaybackState::Idle);
    }

    #[test]
    fn section_change_stops_playback_and_hides_player() {
        let narrator = RecordingNarrator::default();
        let mut model = model();
        model.navigate_to(at("a"), &narrator);
        model.toggle_playback(&narrator);
        model.handle_narration_event(&NarrationEvent::Boundary { id: 1, char_index: 3 });
        assert_eq!(model.playback_state(), PlaybackState::Playing);
        assert!(model.ui_state().show_player);

        model.go_next(&narrator);
        assert_eq!(model.location(), &at("b"));
        assert_eq!(model.playback_state(), PlaybackState::Idle);
        assert_eq!(model.playback_info().progress, 0);
        assert!(!model.ui_state().show_player);
        assert_eq!(narrator.calls().last().map(String::as_str), Some("cancel 1"));

        // A late completion from the old utterance must not leak into the new section
        model.handle_narration_event(&NarrationEvent::Finished { id: 1 });
        assert_eq!(model.playback_info().progress, 0);
    }

    #[test]
    fn navigating_to_same_section_keeps_narration() {
        let narrator = RecordingNarrator::default();
        let mut model = model();
        model.navigate_to(at("a"), &narrator);
        model.toggle_playback(&narrator);
        model.navigate_to(at("a"), &narrator);
        assert_eq!(model.playback_state(), PlaybackState::Playing);
    }

    #[test]
    fn unknown_target_lands_on_first_section() {
        let narrator = RecordingNarrator::default();
        let mut model = model();
        model.navigate_to(at("ghost"), &narrator);
        assert_eq!(model.location(), &at("a"));
    }

    #[test]
    fn previous_from_first_section_returns_to_toc() {
        let narrator = RecordingNarrator::default();
        let mut model = model();
        model.go_next(&narrator);
        assert_eq!(model.location(), &at("a"));
        model.go_previous(&narrator);
        assert_eq!(model.location(), &Location::TableOfContents);
        model.go_previous(&narrator);
        assert_eq!(model.location(), &Location::TableOfContents);
    }

    #[test]
    fn toc_cannot_be_narrated_or_bookmarked() {
        let narrator = RecordingNarrator::default();
        let mut model = model();
        model.toggle_playback(&narrator);
        assert_eq!(model.playback_state(), PlaybackState::Idle);
        assert_eq!(model.toggle_current_bookmark(), None);
        assert!(narrator.calls().is_empty());
    }

    #[test]
    fn bookmarks_list_in_insertion_order_with_titles() {
        let narrator = RecordingNarrator::default();
        let mut model = model();
        model.navigate_to(at("d"), &narrator);
        assert_eq!(model.toggle_current_bookmark(), Some(true));
        model.navigate_to(at("a"), &narrator);
        model.toggle_current_bookmark();

        let entries = model.bookmark_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].section_id, "d");
        assert_eq!(entries[0].chapter_title, "Three");
        assert_eq!(entries[1].title, "A");

        model.ui_state.active_pane = ActivePane::Bookmarks;
        model.move_selection_down();
        model.open_selected_bookmark(&narrator);
        assert_eq!(model.location(), &at("a"));
    }

    #[test]
    fn contents_selection_follows_navigation() {
        let narrator = RecordingNarrator::default();
        let mut model = model();
        model.navigate_to(at("c"), &narrator);
        assert_eq!(model.ui_state().contents_selected, 2);

        model.ui_state.active_pane = ActivePane::Contents;
        model.move_selection_down();
        model.open_selected_contents_entry(&narrator);
        assert_eq!(model.location(), &at("d"));
        assert_eq!(model.ui_state().active_pane, ActivePane::Reader);
    }

    #[test]
    fn unexpected_narration_failure_sets_error_status() {
        let narrator = RecordingNarrator::default();
        let mut model = model();
        model.navigate_to(at("a"), &narrator);
        model.toggle_playback(&narrator);
        model.handle_narration_event(&NarrationEvent::Failed {
            id: 1,
            cause: crate::narration::NarrationErrorCause::SynthesisFailed("no voice".to_string()),
        });
        assert_eq!(model.playback_state(), PlaybackState::Idle);
        let status = model.ui_state().status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("no voice"));
    }

    #[test]
    fn speak_failure_is_reported_without_crashing() {
        let narrator = RecordingNarrator::failing();
        let mut model = model();
        model.navigate_to(at("a"), &narrator);
        model.toggle_playback(&narrator);
        assert_eq!(model.playback_state(), PlaybackState::Idle);
        assert!(model.ui_state().status.is_some());
    }

    #[test]
    fn status_clears_itself_after_timeout() {
        let mut model = model();
        model.set_status("Copied to clipboard".to_string(), StatusKind::Info);
        model.auto_clear_status();
        assert!(model.ui_state().status.is_some(), "fresh status stays visible");

        if let Some(status) = model.ui_state.status.as_mut() {
            status.shown_at = Instant::now()
                .checked_sub(STATUS_TIMEOUT + Duration::from_millis(100))
                .unwrap();
        }
        assert!(model.ui_state().status.as_ref().unwrap().is_expired());
        model.auto_clear_status();
        assert!(model.ui_state().status.is_none());
    }
}
