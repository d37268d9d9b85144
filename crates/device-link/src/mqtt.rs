//! Publish transport over MQTT, plain or TLS.

use crate::{DeviceCommand, DeviceTransport, Result, TransportError};
use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS, Transport};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default)]
    pub tls: bool,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_keep_alive_s")]
    pub keep_alive_s: u64,
}

fn default_port() -> u16 {
    1883
}

fn default_topic() -> String {
    "esp32/commands".to_string()
}

fn default_client_id() -> String {
    "cardslot".to_string()
}

fn default_keep_alive_s() -> u64 {
    60
}

/// Publishes each command to one topic. The broker connection is driven by
/// a background task for the lifetime of the transport.
pub struct MqttTransport {
    client: AsyncClient,
    topic: String,
    publish_timeout: Duration,
    event_loop: JoinHandle<()>,
}

impl MqttTransport {
    /// Must be called inside a tokio runtime.
    pub fn connect(settings: &MqttSettings, publish_timeout: Duration) -> Self {
        let mut options =
            MqttOptions::new(settings.client_id.clone(), settings.host.clone(), settings.port);
        options.set_keep_alive(Duration::from_secs(settings.keep_alive_s.max(5)));
        if settings.tls {
            options.set_transport(Transport::tls_with_default_config());
        }

        let (client, mut event_loop) = AsyncClient::new(options, 16);
        let broker = format!("{}:{}", settings.host, settings.port);
        let handle = tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        info!(%broker, code = ?ack.code, "MQTT broker connected");
                    }
                    Ok(event) => debug!(?event, "mqtt event"),
                    Err(e) => {
                        warn!(%broker, "MQTT connection error: {}", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        Self {
            client,
            topic: settings.topic.clone(),
            publish_timeout,
            event_loop: handle,
        }
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        self.event_loop.abort();
    }
}

#[async_trait]
impl DeviceTransport for MqttTransport {
    async fn send(&self, command: &DeviceCommand) -> Result<()> {
        let publish = self.client.publish(
            self.topic.clone(),
            QoS::AtMostOnce,
            false,
            command.as_str().as_bytes().to_vec(),
        );
        match tokio::time::timeout(self.publish_timeout, publish).await {
            Ok(Ok(())) => {
                debug!(topic = %self.topic, %command, "command published");
                Ok(())
            }
            Ok(Err(e)) => Err(TransportError::Io(e.to_string())),
            Err(_) => Err(TransportError::Timeout),
        }
    }

    fn name(&self) -> &str {
        "mqtt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_fill_defaults() {
        let s: MqttSettings = serde_json::from_str(r#"{"host":"broker.local"}"#).unwrap();
        assert_eq!(s.port, 1883);
        assert_eq!(s.topic, "esp32/commands");
        assert!(!s.tls);
    }

    #[tokio::test]
    async fn publish_times_out_when_broker_is_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let settings = MqttSettings {
            host: "127.0.0.1".into(),
            port,
            topic: "esp32/commands".into(),
            tls: false,
            client_id: "cardslot-test".into(),
            keep_alive_s: 5,
        };
        let bound = Duration::from_millis(100);
        let transport = MqttTransport::connect(&settings, bound);

        // Publishes queue in the client until its request buffer fills; the
        // next one must give up within the bound instead of hanging.
        let mut outcome = Ok(());
        for _ in 0..64 {
            let start = std::time::Instant::now();
            outcome = transport.send(&DeviceCommand::from("r")).await;
            assert!(start.elapsed() < bound * 5);
            if outcome.is_err() {
                break;
            }
        }
        assert!(matches!(outcome, Err(TransportError::Timeout)), "got {outcome:?}");
    }
}
