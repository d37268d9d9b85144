use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    #[serde(default = "default_language")]
    pub language: String,
    /// How long to wait for speech to start.
    #[serde(default = "default_listen_timeout_ms")]
    pub listen_timeout_ms: u64,
    /// Upper bound on one phrase.
    #[serde(default = "default_phrase_limit_ms")]
    pub phrase_limit_ms: u64,
}

fn default_language() -> String {
    "ko-KR".to_string()
}

fn default_listen_timeout_ms() -> u64 {
    5000
}

fn default_phrase_limit_ms() -> u64 {
    7000
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            listen_timeout_ms: default_listen_timeout_ms(),
            phrase_limit_ms: default_phrase_limit_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub ts: Option<OffsetDateTime>,
}

#[derive(Debug, Error)]
pub enum VoiceError {
    /// Audio was captured but produced no usable text.
    #[error("speech not recognized")]
    NotRecognized,
    #[error("no speech within {0} ms")]
    ListenTimeout(u64),
    #[error("recognizer backend error: {0}")]
    Backend(String),
    #[error("playback failed: {0}")]
    Playback(String),
}
