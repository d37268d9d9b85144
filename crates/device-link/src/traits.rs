use crate::{DeviceCommand, Result};
use async_trait::async_trait;

/// Fire-and-forget delivery of one command. No application-level retry:
/// a failed send is reported to the caller and not repeated.
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    async fn send(&self, command: &DeviceCommand) -> Result<()>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}
