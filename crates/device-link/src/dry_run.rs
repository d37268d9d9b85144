use crate::{DeviceCommand, DeviceTransport, Result};
use async_trait::async_trait;

/// Dry-run transport: logs every command and reports success.
#[derive(Debug, Default, Clone)]
pub struct LogTransport;

#[async_trait]
impl DeviceTransport for LogTransport {
    async fn send(&self, command: &DeviceCommand) -> Result<()> {
        tracing::info!(%command, "device command (dry run)");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
