//! Request/response transport: POST `{"command": "..."}` to the controller.

use crate::{DeviceCommand, DeviceTransport, Result, TransportError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// `timeout` bounds the whole request so a dead controller cannot hang
    /// the dispatcher.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Io(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DeviceTransport for HttpTransport {
    async fn send(&self, command: &DeviceCommand) -> Result<()> {
        #[derive(serde::Serialize)]
        struct CommandReq<'a> {
            command: &'a str,
        }

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&CommandReq {
                command: command.as_str(),
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Unreachable(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, %command, %status, "controller rejected command");
            return Err(TransportError::Rejected(status.as_u16()));
        }
        debug!(endpoint = %self.endpoint, %command, "command delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
