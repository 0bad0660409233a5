//! Timer-paced narration engine
//!
//! Walks the word boundaries of the submitted text at the speaking rate and
//! reports each one, the way a platform speech service reports boundary
//! callbacks. With a [`VoiceCommand`] attached the same pacing also drives
//! an external synthesizer, restarted from the last boundary after a pause.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::{mpsc, watch};

use super::voice::{BASE_WORDS_PER_MINUTE, VoiceCommand};
use super::{
    NarrationError, NarrationErrorCause, NarrationEvent, NarrationEventChannel, Narrator,
    SpeechParams, UtteranceId,
};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Control {
    Run,
    Pause,
    Stop(NarrationErrorCause),
}

struct ActiveUtterance {
    id: UtteranceId,
    control: watch::Sender<Control>,
}

pub struct PacedNarrator {
    voice: Option<VoiceCommand>,
    events_tx: mpsc::UnboundedSender<NarrationEvent>,
    events_rx: Mutex<Option<NarrationEventChannel>>,
    next_id: AtomicU64,
    active: Mutex<Option<ActiveUtterance>>,
}

impl PacedNarrator {
    /// Narrator that reports progress without producing audio
    pub fn silent() -> Self {
        Self::build(None)
    }

    pub fn with_voice(voice: VoiceCommand) -> Self {
        Self::build(Some(voice))
    }

    fn build(voice: Option<VoiceCommand>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            voice,
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
            next_id: AtomicU64::new(1),
            active: Mutex::new(None),
        }
    }

    fn send_control(&self, id: UtteranceId, control: Control) {
        let Ok(active) = self.active.lock() else {
            tracing::error!("Narrator state poisoned");
            return;
        };
        match active.as_ref() {
            Some(utterance) if utterance.id == id => {
                // A finished task has dropped its receiver; nothing to tell it
                let _ = utterance.control.send(control);
            }
            _ => tracing::trace!(id, ?control, "Control request for inactive utterance ignored"),
        }
    }
}

impl Narrator for PacedNarrator {
    fn speak(&self, text: &str, params: &SpeechParams) -> Result<UtteranceId, NarrationError> {
        if text.trim().is_empty() {
            return Err(NarrationError::EmptyText);
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| NarrationError::Unavailable(e.to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (control_tx, control_rx) = watch::channel(Control::Run);

        {
            let mut active = self
                .active
                .lock()
                .map_err(|_| NarrationError::Unavailable("narrator state poisoned".to_string()))?;
            if let Some(previous) = active.replace(ActiveUtterance { id, control: control_tx }) {
                let _ = previous.control.send(Control::Stop(NarrationErrorCause::Interrupted));
            }
        }

        tracing::debug!(id, chars = text.chars().count(), rate = params.rate, "Starting utterance");

        let utterance = Utterance {
            id,
            text: text.to_string(),
            params: params.clone(),
            voice: self.voice.clone(),
            events: self.events_tx.clone(),
        };
        runtime.spawn(utterance.run(control_rx));
        Ok(id)
    }

    fn pause(&self, id: UtteranceId) {
        self.send_control(id, Control::Pause);
    }

    fn resume(&self, id: UtteranceId) {
        self.send_control(id, Control::Run);
    }

    fn cancel(&self, id: UtteranceId) {
        self.send_control(id, Control::Stop(NarrationErrorCause::Canceled));
    }

    fn take_event_channel(&self) -> Option<NarrationEventChannel> {
        self.events_rx.lock().ok().and_then(|mut rx| rx.take())
    }
}

/// Char offsets (and matching byte offsets) at which words start
fn word_boundaries(text: &str) -> Vec<(usize, usize)> {
    let mut boundaries = Vec::new();
    let mut previous_was_space = true;
    for (char_index, (byte_index, c)) in text.char_indices().enumerate() {
        let is_space = c.is_whitespace();
        if previous_was_space && !is_space {
            boundaries.push((char_index, byte_index));
        }
        previous_was_space = is_space;
    }
    boundaries
}

fn word_delay(rate: f32) -> Duration {
    let words_per_minute = (BASE_WORDS_PER_MINUTE * rate.max(0.1)) as f64;
    Duration::from_secs_f64(60.0 / words_per_minute)
}

/// One in-flight speak request, owned by its task
struct Utterance {
    id: UtteranceId,
    text: String,
    params: SpeechParams,
    voice: Option<VoiceCommand>,
    events: mpsc::UnboundedSender<NarrationEvent>,
}

enum Outcome {
    Finished,
    Stopped(NarrationErrorCause),
}

impl Utterance {
    async fn run(self, mut control: watch::Receiver<Control>) {
        let outcome = self.drive(&mut control).await;
        let event = match outcome {
            Outcome::Finished => {
                tracing::debug!(id = self.id, "Utterance finished");
                NarrationEvent::Finished { id: self.id }
            }
            Outcome::Stopped(cause) => {
                tracing::debug!(id = self.id, %cause, "Utterance stopped");
                NarrationEvent::Failed { id: self.id, cause }
            }
        };
        let _ = self.events.send(event);
    }

    async fn drive(&self, control: &mut watch::Receiver<Control>) -> Outcome {
        let boundaries = word_boundaries(&self.text);
        let delay = word_delay(self.params.rate);
        let mut resume_byte = 0;
        let mut child = match self.start_voice(resume_byte) {
            Ok(child) => child,
            Err(cause) => return Outcome::Stopped(cause),
        };

        let mut next = 0;
        loop {
            let state = control.borrow_and_update().clone();
            match state {
                Control::Stop(cause) => return Outcome::Stopped(cause),
                Control::Pause => {
                    stop_voice(&mut child).await;
                    if control.changed().await.is_err() {
                        return Outcome::Stopped(NarrationErrorCause::Interrupted);
                    }
                    if *control.borrow() == Control::Run {
                        child = match self.start_voice(resume_byte) {
                            Ok(child) => child,
                            Err(cause) => return Outcome::Stopped(cause),
                        };
                    }
                    continue;
                }
                Control::Run => {}
            }

            let Some(&(char_index, byte_index)) = boundaries.get(next) else {
                break;
            };
            resume_byte = byte_index;
            let _ = self.events.send(NarrationEvent::Boundary { id: self.id, char_index });
            next += 1;

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = control.changed() => {
                    if changed.is_err() {
                        stop_voice(&mut child).await;
                        return Outcome::Stopped(NarrationErrorCause::Interrupted);
                    }
                }
            }
        }

        // Boundaries are exhausted; let the synthesizer finish speaking
        while let Some(running) = child.as_mut() {
            tokio::select! {
                status = running.wait() => {
                    child = None;
                    match status {
                        Ok(status) if status.success() => {}
                        Ok(status) => {
                            return Outcome::Stopped(NarrationErrorCause::SynthesisFailed(
                                format!("voice exited with {}", status),
                            ));
                        }
                        Err(e) => {
                            return Outcome::Stopped(NarrationErrorCause::SynthesisFailed(e.to_string()));
                        }
                    }
                }
                changed = control.changed() => {
                    if changed.is_err() {
                        stop_voice(&mut child).await;
                        return Outcome::Stopped(NarrationErrorCause::Interrupted);
                    }
                    let state = control.borrow_and_update().clone();
                    match state {
                        Control::Stop(cause) => {
                            stop_voice(&mut child).await;
                            return Outcome::Stopped(cause);
                        }
                        Control::Pause => {
                            stop_voice(&mut child).await;
                            loop {
                                if control.changed().await.is_err() {
                                    return Outcome::Stopped(NarrationErrorCause::Interrupted);
                                }
                                let state = control.borrow_and_update().clone();
                                match state {
                                    Control::Stop(cause) => return Outcome::Stopped(cause),
                                    Control::Run => break,
                                    Control::Pause => {}
                                }
                            }
                            child = match self.start_voice(resume_byte) {
                                Ok(child) => child,
                                Err(cause) => return Outcome::Stopped(cause),
                            };
                        }
                        Control::Run => {}
                    }
                }
            }
        }

        Outcome::Finished
    }

    fn start_voice(&self, from_byte: usize) -> Result<Option<Child>, NarrationErrorCause> {
        let Some(voice) = &self.voice else {
            return Ok(None);
        };
        let remaining = &self.text[from_byte..];
        match voice.spawn(&self.params, remaining) {
            Ok(child) => Ok(Some(child)),
            Err(e) => {
                tracing::error!(id = self.id, program = voice.program(), error = %e, "Voice failed to start");
                Err(NarrationErrorCause::SynthesisFailed(e.to_string()))
            }
        }
    }
}

async fn stop_voice(child: &mut Option<Child>) {
    if let Some(mut running) = child.take() {
        if let Err(e) = running.kill().await {
            tracing::debug!(error = %e, "Voice process already gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "one two three";

    async fn next_event(rx: &mut NarrationEventChannel) -> NarrationEvent {
        rx.recv().await.expect("narrator channel open")
    }

    #[test]
    fn finds_word_starts_in_chars() {
        assert_eq!(word_boundaries("  héllo  wörld\n"), vec![(2, 2), (9, 10)]);
        assert!(word_boundaries("   ").is_empty());
    }

    #[test]
    fn faster_rate_shortens_delay() {
        assert!(word_delay(2.0) < word_delay(1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn reports_boundaries_then_finishes() {
        let narrator = PacedNarrator::silent();
        let mut rx = narrator.take_event_channel().unwrap();
        assert!(narrator.take_event_channel().is_none());

        let id = narrator.speak(TEXT, &SpeechParams::default()).unwrap();
        assert_eq!(next_event(&mut rx).await, NarrationEvent::Boundary { id, char_index: 0 });
        assert_eq!(next_event(&mut rx).await, NarrationEvent::Boundary { id, char_index: 4 });
        assert_eq!(next_event(&mut rx).await, NarrationEvent::Boundary { id, char_index: 8 });
        assert_eq!(next_event(&mut rx).await, NarrationEvent::Finished { id });
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_and_resume_continues() {
        let narrator = PacedNarrator::silent();
        let mut rx = narrator.take_event_channel().unwrap();

        let id = narrator.speak(TEXT, &SpeechParams::default()).unwrap();
        assert_eq!(next_event(&mut rx).await, NarrationEvent::Boundary { id, char_index: 0 });

        narrator.pause(id);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());

        narrator.resume(id);
        assert_eq!(next_event(&mut rx).await, NarrationEvent::Boundary { id, char_index: 4 });

        narrator.cancel(id);
        assert_eq!(
            next_event(&mut rx).await,
            NarrationEvent::Failed { id, cause: NarrationErrorCause::Canceled }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn new_speak_interrupts_previous() {
        let narrator = PacedNarrator::silent();
        let mut rx = narrator.take_event_channel().unwrap();

        let first = narrator.speak(TEXT, &SpeechParams::default()).unwrap();
        let second = narrator.speak("four", &SpeechParams::default()).unwrap();
        assert_ne!(first, second);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            let done = event == NarrationEvent::Finished { id: second };
            events.push(event);
            if done {
                break;
            }
        }
        assert!(events.contains(&NarrationEvent::Failed {
            id: first,
            cause: NarrationErrorCause::Interrupted
        }));
        assert!(!events.contains(&NarrationEvent::Finished { id: first }));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_controls_are_ignored() {
        let narrator = PacedNarrator::silent();
        let mut rx = narrator.take_event_channel().unwrap();

        let id = narrator.speak("solo", &SpeechParams::default()).unwrap();
        narrator.cancel(id + 100);
        assert_eq!(next_event(&mut rx).await, NarrationEvent::Boundary { id, char_index: 0 });
        assert_eq!(next_event(&mut rx).await, NarrationEvent::Finished { id });
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let narrator = PacedNarrator::silent();
        assert!(matches!(
            narrator.speak("  \n", &SpeechParams::default()),
            Err(NarrationError::EmptyText)
        ));
    }

    #[test]
    fn speak_outside_runtime_is_unavailable() {
        let narrator = PacedNarrator::silent();
        assert!(matches!(
            narrator.speak(TEXT, &SpeechParams::default()),
            Err(NarrationError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn missing_voice_program_fails_utterance() {
        let narrator = PacedNarrator::with_voice(VoiceCommand::new("definitely-not-a-speech-program"));
        let mut rx = narrator.take_event_channel().unwrap();

        let id = narrator.speak(TEXT, &SpeechParams::default()).unwrap();
        match next_event(&mut rx).await {
            NarrationEvent::Failed { id: failed, cause: NarrationErrorCause::SynthesisFailed(_) } => {
                assert_eq!(failed, id);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
