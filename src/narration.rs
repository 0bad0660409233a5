//! Host narration facility
//!
//! The reader never synthesizes speech itself. It hands a whole section's
//! script to a [`Narrator`] and reacts to the events the narrator sends back
//! over its event channel: word boundaries, completion and failures.
//!
//! - `paced`: built-in engine that walks word boundaries on a timer
//! - `voice`: optional external speech command driven by the paced engine

mod paced;
mod voice;

use std::fmt;

use tokio::sync::mpsc;

pub use paced::PacedNarrator;
pub use voice::VoiceCommand;

/// Identifies one speak request for its whole lifetime
pub type UtteranceId = u64;

/// Receiving half of a narrator's notifications
pub type NarrationEventChannel = mpsc::UnboundedReceiver<NarrationEvent>;

/// Voice parameters attached to every speak request
#[derive(Clone, Debug, PartialEq)]
pub struct SpeechParams {
    pub locale: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

/// Why an utterance stopped before completing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NarrationErrorCause {
    /// `cancel` was requested
    Canceled,
    /// A newer utterance replaced this one
    Interrupted,
    /// The audio output is held by someone else
    AudioBusy,
    SynthesisFailed(String),
}

impl NarrationErrorCause {
    /// Cancellation and interruption are the normal result of stop/replace
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Canceled | Self::Interrupted)
    }
}

impl fmt::Display for NarrationErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canceled => f.write_str("canceled"),
            Self::Interrupted => f.write_str("interrupted"),
            Self::AudioBusy => f.write_str("audio output busy"),
            Self::SynthesisFailed(reason) => write!(f, "synthesis failed: {}", reason),
        }
    }
}

/// Notification from the narrator about one utterance
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NarrationEvent {
    /// Narration reached approximately this char offset of the submitted text
    Boundary { id: UtteranceId, char_index: usize },
    Finished { id: UtteranceId },
    Failed { id: UtteranceId, cause: NarrationErrorCause },
}

impl NarrationEvent {
    pub fn id(&self) -> UtteranceId {
        match self {
            Self::Boundary { id, .. } | Self::Finished { id } | Self::Failed { id, .. } => *id,
        }
    }
}

/// Errors returned synchronously by a speak request
#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error("Nothing to narrate")]
    EmptyText,

    #[error("Narration engine unavailable: {0}")]
    Unavailable(String),
}

/// Text-to-speech capability the playback controller drives.
///
/// Requests never block. Progress, completion and failure arrive later on
/// the channel returned by [`Narrator::take_event_channel`].
pub trait Narrator: Send + Sync {
    fn speak(&self, text: &str, params: &SpeechParams) -> Result<UtteranceId, NarrationError>;

    fn pause(&self, id: UtteranceId);

    fn resume(&self, id: UtteranceId);

    fn cancel(&self, id: UtteranceId);

    /// Hand out the event receiver; only the first caller gets it
    fn take_event_channel(&self) -> Option<NarrationEventChannel>;
}
