use crate::{Transcript, VoiceError};
use async_trait::async_trait;

/// Captures one utterance and returns its transcript.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn listen(&self) -> Result<Transcript, VoiceError>;

    fn name(&self) -> &str {
        "recognizer"
    }
}

/// Plays spoken feedback. Blocking; callers serialize access.
pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str) -> Result<(), VoiceError>;
}
