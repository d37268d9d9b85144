use crate::{DeviceCommand, DeviceTransport, Result, SentCommand, Timestamp, TransportError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-process recording transport. Every accepted command is kept in order;
/// failures can be injected for all commands or for specific strings.
#[derive(Debug, Default)]
pub struct MockTransport {
    sent: Mutex<Vec<SentCommand>>,
    fail_all: AtomicBool,
    fail_on: Mutex<HashSet<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }

    /// Fail only when this exact command is sent.
    pub fn fail_on(&self, command: &str) {
        if let Ok(mut set) = self.fail_on.lock() {
            set.insert(command.to_string());
        }
    }

    pub fn sent(&self) -> Vec<SentCommand> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Accepted command strings, in send order.
    pub fn sent_strings(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|s| s.command.into_inner())
            .collect()
    }
}

#[async_trait]
impl DeviceTransport for MockTransport {
    async fn send(&self, command: &DeviceCommand) -> Result<()> {
        let targeted = self
            .fail_on
            .lock()
            .map(|set| set.contains(command.as_str()))
            .unwrap_or(false);
        if self.fail_all.load(Ordering::SeqCst) || targeted {
            return Err(TransportError::Unreachable("mock transport offline".into()));
        }
        let mut sent = self.sent.lock().map_err(|_| TransportError::Closed)?;
        sent.push(SentCommand {
            command: command.clone(),
            at: Timestamp::now(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
