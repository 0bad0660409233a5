//! Runtime configuration from the environment
//!
//! Every knob has a default so the reader starts with no configuration at
//! all. Values that do not parse are logged and replaced by the default.

use std::path::PathBuf;

use crate::narration::SpeechParams;

pub const BOOK_ENV: &str = "READER_BOOK";
pub const DATA_DIR_ENV: &str = "READER_DATA_DIR";
pub const LOG_DIR_ENV: &str = "READER_LOG_DIR";
pub const NARRATOR_ENV: &str = "READER_NARRATOR";
pub const VOICE_LOCALE_ENV: &str = "READER_VOICE_LOCALE";
pub const VOICE_RATE_ENV: &str = "READER_VOICE_RATE";
pub const VOICE_PITCH_ENV: &str = "READER_VOICE_PITCH";

const APP_DIR_NAME: &str = "reader-rs";
const FALLBACK_DATA_DIR: &str = ".reader-rs";
const DEFAULT_LOG_DIR: &str = ".logs";

const RATE_RANGE: (f32, f32) = (0.1, 10.0);
const PITCH_RANGE: (f32, f32) = (0.0, 2.0);

/// Where the book comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookSource {
    /// The sample book compiled into the binary
    Embedded,
    File(PathBuf),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NarratorKind {
    /// External espeak-ng voice, paced by the built-in engine
    Espeak,
    /// Progress only, no audio
    Silent,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReaderConfig {
    pub book: BookSource,
    pub data_dir: PathBuf,
    pub narrator: NarratorKind,
    pub speech: SpeechParams,
}

impl ReaderConfig {
    /// Read configuration from the process arguments and environment.
    /// The first positional argument, if any, is the book path.
    pub fn from_env() -> Self {
        let book_arg = std::env::args().nth(1);
        Self::from_lookup(book_arg, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(book_arg: Option<String>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let book = book_arg
            .or_else(|| lookup(BOOK_ENV))
            .filter(|path| !path.trim().is_empty())
            .map(|path| BookSource::File(PathBuf::from(path)))
            .unwrap_or(BookSource::Embedded);

        let data_dir = lookup(DATA_DIR_ENV)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let narrator = match lookup(NARRATOR_ENV).as_deref().map(str::trim) {
            None | Some("") => NarratorKind::Espeak,
            Some(value) if value.eq_ignore_ascii_case("espeak") => NarratorKind::Espeak,
            Some(value) if value.eq_ignore_ascii_case("silent") => NarratorKind::Silent,
            Some(value) => {
                tracing::warn!(key = NARRATOR_ENV, value, "Unknown narrator, using espeak");
                NarratorKind::Espeak
            }
        };

        let defaults = SpeechParams::default();
        let speech = SpeechParams {
            locale: lookup(VOICE_LOCALE_ENV)
                .filter(|locale| !locale.trim().is_empty())
                .unwrap_or(defaults.locale),
            rate: parse_ranged(&lookup, VOICE_RATE_ENV, defaults.rate, RATE_RANGE),
            pitch: parse_ranged(&lookup, VOICE_PITCH_ENV, defaults.pitch, PITCH_RANGE),
        };

        Self { book, data_dir, narrator, speech }
    }

    /// Log directory, needed before logging (and thus the rest of the config) exists
    pub fn log_dir_from_env() -> PathBuf {
        std::env::var(LOG_DIR_ENV)
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
    }
}

fn default_data_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}

fn parse_ranged(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: f32,
    (min, max): (f32, f32),
) -> f32 {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<f32>() {
        Ok(value) if value.is_finite() => value.clamp(min, max),
        _ => {
            tracing::warn!(key, value = %raw, default, "Ignoring unparsable setting");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(arg: Option<&str>, vars: &[(&str, &str)]) -> ReaderConfig {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ReaderConfig::from_lookup(arg.map(str::to_string), |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(None, &[]);
        assert_eq!(config.book, BookSource::Embedded);
        assert_eq!(config.narrator, NarratorKind::Espeak);
        assert_eq!(config.speech, SpeechParams::default());
        assert!(config.data_dir.ends_with(APP_DIR_NAME) || config.data_dir.ends_with(FALLBACK_DATA_DIR));
    }

    #[test]
    fn argument_wins_over_environment() {
        let from_arg = config(Some("cli.json"), &[(BOOK_ENV, "env.json")]);
        assert_eq!(from_arg.book, BookSource::File(PathBuf::from("cli.json")));

        let from_env = config(None, &[(BOOK_ENV, "env.json")]);
        assert_eq!(from_env.book, BookSource::File(PathBuf::from("env.json")));
    }

    #[test]
    fn reads_voice_and_narrator_settings() {
        let config = config(
            None,
            &[
                (NARRATOR_ENV, "Silent"),
                (VOICE_LOCALE_ENV, "de-DE"),
                (VOICE_RATE_ENV, "1.5"),
                (VOICE_PITCH_ENV, "0.8"),
                (DATA_DIR_ENV, "/tmp/reader"),
            ],
        );
        assert_eq!(config.narrator, NarratorKind::Silent);
        assert_eq!(config.speech.locale, "de-DE");
        assert_eq!(config.speech.rate, 1.5);
        assert_eq!(config.speech.pitch, 0.8);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/reader"));
    }

    #[test]
    fn bad_values_fall_back_or_clamp() {
        let config = config(
            None,
            &[(NARRATOR_ENV, "robot"), (VOICE_RATE_ENV, "fast"), (VOICE_PITCH_ENV, "9")],
        );
        assert_eq!(config.narrator, NarratorKind::Espeak);
        assert_eq!(config.speech.rate, 1.0);
        assert_eq!(config.speech.pitch, 2.0);
    }
}
