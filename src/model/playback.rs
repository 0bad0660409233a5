//! Narration playback state machine
//!
//! Idle -> Playing -> Paused -> Playing ... with `stop` returning to Idle
//! from anywhere. Only the live utterance may move the state; events for
//! anything else are stale and dropped.

use crate::narration::{
    NarrationError, NarrationErrorCause, NarrationEvent, Narrator, SpeechParams, UtteranceId,
};

use super::content::Section;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Snapshot of playback for rendering
#[derive(Clone, Debug, Default)]
pub struct PlaybackInfo {
    pub state: PlaybackState,
    /// 0..=100
    pub progress: u8,
    pub section_title: Option<String>,
}

/// Owns the narration request for the active section
#[derive(Debug, Default)]
pub struct PlaybackController {
    state: PlaybackState,
    progress: u8,
    params: SpeechParams,
    utterance: Option<UtteranceId>,
    text_len: usize,
    section_title: Option<String>,
}

impl PlaybackController {
    pub fn new(params: SpeechParams) -> Self {
        Self { params, ..Self::default() }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn info(&self) -> PlaybackInfo {
        PlaybackInfo {
            state: self.state,
            progress: self.progress,
            section_title: self.section_title.clone(),
        }
    }

    /// Single play/pause control: start from Idle, otherwise flip between
    /// Playing and Paused.
    pub fn toggle(&mut self, section: &Section, narrator: &dyn Narrator) -> Result<(), NarrationError> {
        match self.state {
            PlaybackState::Idle => self.start(section, narrator),
            PlaybackState::Playing => {
                if let Some(id) = self.utterance {
                    narrator.pause(id);
                }
                self.state = PlaybackState::Paused;
                tracing::debug!(progress = self.progress, "Narration paused");
                Ok(())
            }
            PlaybackState::Paused => {
                if let Some(id) = self.utterance {
                    narrator.resume(id);
                }
                self.state = PlaybackState::Playing;
                tracing::debug!(progress = self.progress, "Narration resumed");
                Ok(())
            }
        }
    }

    fn start(&mut self, section: &Section, narrator: &dyn Narrator) -> Result<(), NarrationError> {
        // Never queue a second utterance behind a stale one
        if let Some(previous) = self.utterance.take() {
            narrator.cancel(previous);
        }

        let text = section.narration_text();
        let id = narrator.speak(&text, &self.params)?;

        self.utterance = Some(id);
        self.text_len = text.chars().count();
        self.progress = 0;
        self.section_title = Some(section.title.clone());
        self.state = PlaybackState::Playing;
        tracing::info!(section_id = %section.id, utterance = id, chars = self.text_len, "Narration started");
        Ok(())
    }

    /// Cancel any narration and return to Idle with no progress
    pub fn stop(&mut self, narrator: &dyn Narrator) {
        if let Some(id) = self.utterance.take() {
            narrator.cancel(id);
            tracing::debug!(utterance = id, "Narration stopped");
        }
        self.state = PlaybackState::Idle;
        self.progress = 0;
        self.text_len = 0;
        self.section_title = None;
    }

    /// Apply a narrator notification. Returns the cause when the live
    /// utterance failed for a reason other than cancellation.
    pub fn handle_event(&mut self, event: &NarrationEvent) -> Option<NarrationErrorCause> {
        if self.utterance != Some(event.id()) {
            tracing::trace!(?event, "Dropping narration event for stale utterance");
            return None;
        }

        match event {
            NarrationEvent::Boundary { char_index, .. } => {
                if self.state == PlaybackState::Playing {
                    self.progress = percent(*char_index, self.text_len);
                }
                None
            }
            NarrationEvent::Finished { .. } => {
                self.utterance = None;
                self.state = PlaybackState::Idle;
                self.progress = 100;
                tracing::info!("Narration finished");
                None
            }
            NarrationEvent::Failed { cause, .. } if cause.is_expected() => {
                tracing::debug!(%cause, "Narration ended by cancellation");
                None
            }
            NarrationEvent::Failed { cause, .. } => {
                tracing::error!(%cause, "Narration failed");
                self.utterance = None;
                self.state = PlaybackState::Idle;
                self.progress = 0;
                Some(cause.clone())
            }
        }
    }
}

fn percent(char_index: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (char_index.saturating_mul(100) / total).min(100) as u8
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::content::ContentBlock;
    use crate::narration::NarrationEventChannel;
    use std::sync::Mutex;

    /// Records every request instead of speaking
    #[derive(Default)]
    pub(crate) struct RecordingNarrator {
        pub calls: Mutex<Vec<String>>,
        pub fail_speak: bool,
        next_id: Mutex<UtteranceId>,
    }

    impl RecordingNarrator {
        /// Narrator whose every speak request is rejected
        pub(crate) fn failing() -> Self {
            Self { fail_speak: true, ..Self::default() }
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl Narrator for RecordingNarrator {
        fn speak(&self, text: &str, _params: &SpeechParams) -> Result<UtteranceId, NarrationError> {
            if self.fail_speak {
                return Err(NarrationError::Unavailable("test".to_string()));
            }
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            self.record(format!("speak {} {:?}", *next, text));
            Ok(*next)
        }

        fn pause(&self, id: UtteranceId) {
            self.record(format!("pause {}", id));
        }

        fn resume(&self, id: UtteranceId) {
            self.record(format!("resume {}", id));
        }

        fn cancel(&self, id: UtteranceId) {
            self.record(format!("cancel {}", id));
        }

        fn take_event_channel(&self) -> Option<NarrationEventChannel> {
            None
        }
    }

    pub(crate) fn section() -> Section {
        Section {
            id: "s".to_string(),
            title: "T".to_string(),
            blocks: vec![
                ContentBlock::Plain("Intro.".to_string()),
                ContentBlock::List { items: vec!["a".to_string(), "b".to_string()] },
                ContentBlock::Footnote { text: "skip me".to_string() },
            ],
        }
    }

    #[test]
    fn stop_from_idle_is_a_no_op() {
        let narrator = RecordingNarrator::default();
        let mut playback = PlaybackController::default();
        playback.stop(&narrator);
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(playback.progress(), 0);
        assert!(narrator.calls().is_empty());
    }

    #[test]
    fn toggle_cycles_play_pause_play() {
        let narrator = RecordingNarrator::default();
        let mut playback = PlaybackController::default();
        let section = section();

        playback.toggle(&section, &narrator).unwrap();
        assert_eq!(playback.state(), PlaybackState::Playing);
        playback.toggle(&section, &narrator).unwrap();
        assert_eq!(playback.state(), PlaybackState::Paused);
        playback.toggle(&section, &narrator).unwrap();
        assert_eq!(playback.state(), PlaybackState::Playing);

        assert_eq!(
            narrator.calls(),
            vec![
                format!("speak 1 {:?}", "T. \n\nIntro. \na. \nb. \n"),
                "pause 1".to_string(),
                "resume 1".to_string(),
            ]
        );
    }

    #[test]
    fn boundaries_advance_progress_while_playing() {
        let narrator = RecordingNarrator::default();
        let mut playback = PlaybackController::default();
        let section = section();
        playback.toggle(&section, &narrator).unwrap();

        // "T. \n\nIntro. \na. \nb. \n" is 21 chars
        playback.handle_event(&NarrationEvent::Boundary { id: 1, char_index: 7 });
        assert_eq!(playback.progress(), 33);

        playback.toggle(&section, &narrator).unwrap();
        playback.handle_event(&NarrationEvent::Boundary { id: 1, char_index: 15 });
        assert_eq!(playback.progress(), 33, "progress is frozen while paused");

        playback.toggle(&section, &narrator).unwrap();
        playback.handle_event(&NarrationEvent::Boundary { id: 1, char_index: 500 });
        assert_eq!(playback.progress(), 100, "progress is clamped");
    }

    #[test]
    fn completion_sets_full_progress() {
        let narrator = RecordingNarrator::default();
        let mut playback = PlaybackController::default();
        playback.toggle(&section(), &narrator).unwrap();
        assert_eq!(playback.handle_event(&NarrationEvent::Finished { id: 1 }), None);
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(playback.progress(), 100);
    }

    #[test]
    fn completion_is_honored_while_paused() {
        let narrator = RecordingNarrator::default();
        let mut playback = PlaybackController::default();
        let section = section();
        playback.toggle(&section, &narrator).unwrap();
        playback.toggle(&section, &narrator).unwrap();
        playback.handle_event(&NarrationEvent::Finished { id: 1 });
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(playback.progress(), 100);
    }

    #[test]
    fn events_after_stop_are_stale() {
        let narrator = RecordingNarrator::default();
        let mut playback = PlaybackController::default();
        playback.toggle(&section(), &narrator).unwrap();
        playback.handle_event(&NarrationEvent::Boundary { id: 1, char_index: 10 });
        playback.stop(&narrator);

        playback.handle_event(&NarrationEvent::Boundary { id: 1, char_index: 15 });
        playback.handle_event(&NarrationEvent::Finished { id: 1 });
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(playback.progress(), 0);
        assert_eq!(narrator.calls().last().map(String::as_str), Some("cancel 1"));
    }

    #[test]
    fn expected_failures_are_ignored() {
        let narrator = RecordingNarrator::default();
        let mut playback = PlaybackController::default();
        playback.toggle(&section(), &narrator).unwrap();
        let cause = playback.handle_event(&NarrationEvent::Failed {
            id: 1,
            cause: NarrationErrorCause::Interrupted,
        });
        assert_eq!(cause, None);
        assert_eq!(playback.state(), PlaybackState::Playing);
    }

    #[test]
    fn unexpected_failure_resets_to_idle_and_reports() {
        let narrator = RecordingNarrator::default();
        let mut playback = PlaybackController::default();
        playback.toggle(&section(), &narrator).unwrap();
        playback.handle_event(&NarrationEvent::Boundary { id: 1, char_index: 10 });
        let cause = playback.handle_event(&NarrationEvent::Failed {
            id: 1,
            cause: NarrationErrorCause::AudioBusy,
        });
        assert_eq!(cause, Some(NarrationErrorCause::AudioBusy));
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(playback.progress(), 0);
    }

    #[test]
    fn failed_speak_stays_idle() {
        let narrator = RecordingNarrator::failing();
        let mut playback = PlaybackController::default();
        assert!(playback.toggle(&section(), &narrator).is_err());
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(playback.info().section_title, None);
    }

    #[test]
    fn replay_after_completion_starts_a_new_utterance() {
        let narrator = RecordingNarrator::default();
        let mut playback = PlaybackController::default();
        let section = section();
        playback.toggle(&section, &narrator).unwrap();
        playback.handle_event(&NarrationEvent::Finished { id: 1 });
        playback.toggle(&section, &narrator).unwrap();
        assert_eq!(playback.state(), PlaybackState::Playing);
        assert_eq!(playback.progress(), 0);
        assert!(narrator.calls().last().unwrap().starts_with("speak 2"));
    }
}
