//! One listen-dispatch-announce cycle for the voice front end.

use crate::{DispatchError, DispatchResult, RequestRunner};
use slot_intent::Intent;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use voice_local::{RecognizerConfig, SerializedSpeaker, Speaker, SpeechRecognizer, VoiceError};

pub struct VoiceSession {
    runner: RequestRunner,
    recognizer: Arc<dyn SpeechRecognizer>,
    speaker: SerializedSpeaker,
    /// Wait for speech to start plus the longest phrase.
    listen_bound: Duration,
    batch: bool,
}

impl VoiceSession {
    pub fn new(
        runner: RequestRunner,
        recognizer: Arc<dyn SpeechRecognizer>,
        speaker: SerializedSpeaker,
        recognition: &RecognizerConfig,
    ) -> Self {
        let listen_bound = Duration::from_millis(
            recognition
                .listen_timeout_ms
                .saturating_add(recognition.phrase_limit_ms),
        );
        Self {
            runner,
            recognizer,
            speaker,
            listen_bound,
            batch: false,
        }
    }

    /// Route recognized speech through the multi-item parser.
    pub fn with_batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    pub fn runner(&self) -> &RequestRunner {
        &self.runner
    }

    /// Listen for one utterance, dispatch it and speak the outcome.
    pub async fn listen_once(&self) -> DispatchResult {
        let heard = match tokio::time::timeout(self.listen_bound, self.recognizer.listen()).await {
            Ok(heard) => heard,
            Err(_) => Err(VoiceError::ListenTimeout(
                u64::try_from(self.listen_bound.as_millis()).unwrap_or(u64::MAX),
            )),
        };
        let result = match heard {
            Ok(transcript) => {
                info!(recognizer = self.recognizer.name(), text = %transcript.text, "speech recognized");
                if self.batch {
                    self.runner.submit_batch(transcript.text).await
                } else {
                    self.runner.submit(transcript.text).await
                }
            }
            Err(e) => {
                warn!(recognizer = self.recognizer.name(), error = %e, "recognition failed");
                DispatchResult::failure(Intent::Unknown, &DispatchError::Voice(e))
            }
        };
        self.announce(&result.message).await;
        result
    }

    /// Dispatch typed text as a single-item command and speak the outcome.
    pub async fn submit_text(&self, text: &str) -> DispatchResult {
        let result = self.runner.submit(text).await;
        self.announce(&result.message).await;
        result
    }

    async fn announce(&self, message: &str) {
        let speaker = self.speaker.clone();
        let message = message.to_string();
        match tokio::task::spawn_blocking(move || speaker.speak(&message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "playback failed"),
            Err(e) => warn!(error = %e, "playback task failed"),
        }
    }
}
