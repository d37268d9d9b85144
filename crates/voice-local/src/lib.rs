//! voice-local: speech recognizer and speaker seams with mock backends
//!
//! Audio capture, transcription and synthesis live outside this workspace;
//! these traits are where they plug in.

mod types;
pub use types::{RecognizerConfig, Transcript, VoiceError};

mod traits;
pub use traits::{Speaker, SpeechRecognizer};

mod playback;
pub use playback::{LogSpeaker, SerializedSpeaker};

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::{RecordingSpeaker, ScriptedRecognizer};

pub mod plugin;
