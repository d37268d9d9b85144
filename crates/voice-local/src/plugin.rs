use crate::{LogSpeaker, Speaker, SpeechRecognizer};
#[cfg(feature = "mock")]
use crate::{RecordingSpeaker, ScriptedRecognizer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerKind {
    /// Replays configured phrases, then reports failures.
    #[default]
    Scripted,
    Whisper,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerKind {
    #[default]
    Log,
    Recording,
}

pub fn new_recognizer(
    kind: RecognizerKind,
    phrases: Vec<String>,
) -> Result<Arc<dyn SpeechRecognizer>, String> {
    match kind {
        RecognizerKind::Scripted => {
            #[cfg(feature = "mock")]
            {
                Ok(Arc::new(ScriptedRecognizer::new(phrases)))
            }
            #[cfg(not(feature = "mock"))]
            {
                let _ = phrases;
                Err("mock feature not enabled".into())
            }
        }
        RecognizerKind::Whisper => Err("whisper backend not yet integrated".into()),
    }
}

pub fn new_speaker(kind: SpeakerKind) -> Result<Arc<dyn Speaker>, String> {
    match kind {
        SpeakerKind::Log => Ok(Arc::new(LogSpeaker)),
        SpeakerKind::Recording => {
            #[cfg(feature = "mock")]
            {
                Ok(Arc::new(RecordingSpeaker::new()))
            }
            #[cfg(not(feature = "mock"))]
            {
                Err("mock feature not enabled".into())
            }
        }
    }
}
