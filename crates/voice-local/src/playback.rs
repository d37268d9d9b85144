use crate::{Speaker, VoiceError};
use std::sync::{Arc, Mutex};

/// Speaker for headless deployments: writes feedback to the log.
#[derive(Debug, Default, Clone)]
pub struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn speak(&self, text: &str) -> Result<(), VoiceError> {
        tracing::info!(text, "speak");
        Ok(())
    }
}

/// Wraps a speaker so overlapping requests never play concurrently.
#[derive(Clone)]
pub struct SerializedSpeaker {
    inner: Arc<dyn Speaker>,
    lock: Arc<Mutex<()>>,
}

impl SerializedSpeaker {
    pub fn new(inner: Arc<dyn Speaker>) -> Self {
        Self {
            inner,
            lock: Arc::new(Mutex::new(())),
        }
    }
}

impl Speaker for SerializedSpeaker {
    fn speak(&self, text: &str) -> Result<(), VoiceError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| VoiceError::Playback("playback lock poisoned".into()))?;
        self.inner.speak(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    /// Fails the test if two calls overlap.
    #[derive(Default)]
    struct OverlapDetector {
        active: AtomicUsize,
        overlaps: AtomicUsize,
    }

    impl Speaker for OverlapDetector {
        fn speak(&self, _text: &str) -> Result<(), VoiceError> {
            if self.active.fetch_add(1, Ordering::SeqCst) > 0 {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            thread::sleep(Duration::from_millis(5));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn playback_never_overlaps() {
        let detector = Arc::new(OverlapDetector::default());
        let speaker = SerializedSpeaker::new(detector.clone());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let s = speaker.clone();
                thread::spawn(move || s.speak(&format!("utterance {i}")))
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap().is_ok());
        }
        assert_eq!(detector.overlaps.load(Ordering::SeqCst), 0);
    }
}
