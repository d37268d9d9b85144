use crate::{Speaker, SpeechRecognizer, Transcript, VoiceError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use time::OffsetDateTime;

/// Replays queued phrases; an exhausted script reports `NotRecognized`.
#[derive(Debug, Default)]
pub struct ScriptedRecognizer {
    script: Mutex<VecDeque<Option<String>>>,
}

impl ScriptedRecognizer {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = phrases.into_iter().map(|p| Some(p.into())).collect();
        Self {
            script: Mutex::new(script),
        }
    }

    pub fn push(&self, phrase: impl Into<String>) {
        if let Ok(mut q) = self.script.lock() {
            q.push_back(Some(phrase.into()));
        }
    }

    /// Queue a recognition failure.
    pub fn push_failure(&self) {
        if let Ok(mut q) = self.script.lock() {
            q.push_back(None);
        }
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn listen(&self) -> Result<Transcript, VoiceError> {
        let next = self
            .script
            .lock()
            .map_err(|_| VoiceError::Backend("script lock poisoned".into()))?
            .pop_front()
            .flatten();
        match next {
            Some(text) if !text.trim().is_empty() => Ok(Transcript {
                text,
                ts: Some(OffsetDateTime::now_utc()),
            }),
            _ => Err(VoiceError::NotRecognized),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Keeps everything it was asked to say.
#[derive(Debug, Default)]
pub struct RecordingSpeaker {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Speaker for RecordingSpeaker {
    fn speak(&self, text: &str) -> Result<(), VoiceError> {
        self.spoken
            .lock()
            .map_err(|_| VoiceError::Playback("speaker lock poisoned".into()))?
            .push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_recognizer_replays_then_fails() {
        let r = ScriptedRecognizer::new(["저장 롯데카드 1"]);
        r.push_failure();
        r.push("   ");
        assert_eq!(r.listen().await.unwrap().text, "저장 롯데카드 1");
        assert!(matches!(r.listen().await, Err(VoiceError::NotRecognized)));
        assert!(matches!(r.listen().await, Err(VoiceError::NotRecognized)));
        assert!(matches!(r.listen().await, Err(VoiceError::NotRecognized)));
    }

    #[test]
    fn recording_speaker_keeps_order() {
        let s = RecordingSpeaker::new();
        s.speak("하나").unwrap();
        s.speak("둘").unwrap();
        assert_eq!(s.spoken(), vec!["하나", "둘"]);
    }
}
