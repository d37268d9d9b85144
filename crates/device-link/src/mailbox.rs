//! Capacity-one command relay for controllers that poll over HTTP.

use crate::{DeviceCommand, DeviceTransport, Result, Timestamp};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

/// Value reported when nothing is pending.
pub const NO_COMMAND: &str = "none";

#[derive(Debug, Default)]
struct MailboxState {
    command: Option<DeviceCommand>,
    delivered: bool,
    acknowledged: bool,
    updated_at: Option<Timestamp>,
}

/// Holds at most one command. A new command overwrites whatever is pending
/// (last write wins); a poll hands the command out once; an ack clears it.
#[derive(Debug, Default)]
pub struct CommandMailbox {
    state: Mutex<MailboxState>,
}

impl CommandMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MailboxState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the pending command and clear the acknowledged flag. Returns
    /// the overwritten command if it had not been acknowledged yet.
    pub fn set(&self, command: DeviceCommand) -> Option<DeviceCommand> {
        let mut state = self.lock();
        let previous = state.command.replace(command);
        state.delivered = false;
        state.acknowledged = false;
        state.updated_at = Some(Timestamp::now());
        previous
    }

    /// Poll: the pending command the first time, [`NO_COMMAND`] afterwards
    /// until a new command is set.
    pub fn poll(&self) -> String {
        let mut state = self.lock();
        if state.acknowledged || state.delivered {
            return NO_COMMAND.to_string();
        }
        match &state.command {
            Some(command) => {
                let out = command.as_str().to_string();
                state.delivered = true;
                out
            }
            None => NO_COMMAND.to_string(),
        }
    }

    /// Pending command without marking it delivered.
    pub fn peek(&self) -> Option<DeviceCommand> {
        let state = self.lock();
        if state.acknowledged {
            None
        } else {
            state.command.clone()
        }
    }

    /// Controller acknowledgment: clear to "none" and mark acknowledged.
    pub fn ack(&self) {
        let mut state = self.lock();
        state.command = None;
        state.acknowledged = true;
        state.updated_at = Some(Timestamp::now());
    }

    pub fn is_acknowledged(&self) -> bool {
        self.lock().acknowledged
    }

    pub fn updated_at(&self) -> Option<Timestamp> {
        self.lock().updated_at
    }
}

/// Transport that parks commands in a [`CommandMailbox`] for the controller
/// to collect.
#[derive(Debug, Clone)]
pub struct MailboxTransport {
    mailbox: Arc<CommandMailbox>,
}

impl MailboxTransport {
    pub fn new(mailbox: Arc<CommandMailbox>) -> Self {
        Self { mailbox }
    }

    pub fn mailbox(&self) -> &Arc<CommandMailbox> {
        &self.mailbox
    }
}

#[async_trait]
impl DeviceTransport for MailboxTransport {
    async fn send(&self, command: &DeviceCommand) -> Result<()> {
        if let Some(previous) = self.mailbox.set(command.clone()) {
            warn!(%previous, %command, "overwrote unacknowledged command");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mailbox"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mailbox_reports_none() {
        let mb = CommandMailbox::new();
        assert_eq!(mb.poll(), NO_COMMAND);
        assert!(!mb.is_acknowledged());
        assert!(mb.updated_at().is_none());
    }

    #[test]
    fn command_is_delivered_exactly_once() {
        let mb = CommandMailbox::new();
        mb.set("x".into());
        assert_eq!(mb.poll(), "x");
        assert_eq!(mb.poll(), NO_COMMAND);
        mb.ack();
        assert_eq!(mb.poll(), NO_COMMAND);
        assert_eq!(mb.poll(), NO_COMMAND);
        mb.set("y".into());
        assert!(!mb.is_acknowledged());
        assert_eq!(mb.poll(), "y");
    }

    #[test]
    fn ack_before_poll_drops_the_command() {
        let mb = CommandMailbox::new();
        mb.set("r".into());
        mb.ack();
        assert!(mb.is_acknowledged());
        assert_eq!(mb.peek(), None);
        assert_eq!(mb.poll(), NO_COMMAND);
    }

    #[test]
    fn last_write_wins() {
        let mb = CommandMailbox::new();
        assert_eq!(mb.set("r".into()), None);
        assert_eq!(mb.set("s".into()), Some(DeviceCommand::from("r")));
        assert_eq!(mb.peek(), Some(DeviceCommand::from("s")));
        assert_eq!(mb.poll(), "s");
        assert_eq!(mb.poll(), NO_COMMAND);
    }

    #[tokio::test]
    async fn transport_parks_commands() {
        let mb = Arc::new(CommandMailbox::new());
        let transport = MailboxTransport::new(mb.clone());
        transport.send(&"l".into()).await.unwrap();
        transport.send(&"s".into()).await.unwrap();
        assert_eq!(transport.name(), "mailbox");
        assert_eq!(mb.poll(), "s");
    }
}
