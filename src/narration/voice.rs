//! External speech command (espeak-ng compatible)

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::{Child, Command};

use super::SpeechParams;

pub const DEFAULT_VOICE_PROGRAM: &str = "espeak-ng";

/// Words per minute at rate 1.0
pub const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// A speech synthesizer reached through a child process
#[derive(Clone, Debug)]
pub struct VoiceCommand {
    program: String,
}

impl VoiceCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check that the program can actually be launched
    pub fn is_available(&self) -> bool {
        std::process::Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    pub fn args(params: &SpeechParams, text: &str) -> Vec<String> {
        let words_per_minute = (BASE_WORDS_PER_MINUTE * params.rate).round().max(1.0) as u32;
        let pitch = (params.pitch * 50.0).round().clamp(0.0, 99.0) as u32;
        vec![
            "-v".to_string(),
            params.locale.to_lowercase(),
            "-s".to_string(),
            words_per_minute.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "--".to_string(),
            text.to_string(),
        ]
    }

    /// Start speaking `text`; the child dies with its handle
    pub fn spawn(&self, params: &SpeechParams, text: &str) -> Result<Child> {
        Command::new(&self.program)
            .args(Self::args(params, text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning {}", self.program))
    }
}

impl Default for VoiceCommand {
    fn default() -> Self {
        Self::new(DEFAULT_VOICE_PROGRAM)
    }
}
