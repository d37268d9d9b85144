use anyhow::{Context, Result};
use device_link::MqttSettings;
use serde::{Deserialize, Serialize};
use slot_intent::{default_synonym_groups, default_templates, IntentTemplate};
use slot_registry::CommandScheme;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use voice_local::plugin::{RecognizerKind, SpeakerKind};
use voice_local::RecognizerConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Upper bound a caller waits for one command.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Settle time between the move and confirm commands.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    /// Parse spoken commands as multi-item batches.
    #[serde(default)]
    pub batch_voice: bool,
    #[serde(default)]
    pub scheme: CommandScheme,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default = "default_synonym_groups")]
    pub synonyms: Vec<Vec<String>>,
    #[serde(default = "default_templates")]
    pub templates: Vec<IntentTemplate>,
    #[serde(default)]
    pub voice: VoiceConfig,
}

fn default_bind() -> String {
    "0.0.0.0:2506".to_string()
}

fn default_request_timeout_ms() -> u64 {
    20_000
}

fn default_pacing_ms() -> u64 {
    1000
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            request_timeout_ms: default_request_timeout_ms(),
            pacing_ms: default_pacing_ms(),
            batch_voice: false,
            scheme: CommandScheme::default(),
            transport: TransportConfig::default(),
            embedding: EmbeddingConfig::default(),
            synonyms: default_synonym_groups(),
            templates: default_templates(),
            voice: VoiceConfig::default(),
        }
    }
}

impl DaemonConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransportConfig {
    Http {
        #[serde(default = "default_device_url")]
        url: String,
        #[serde(default = "default_device_timeout_ms")]
        timeout_ms: u64,
    },
    Mqtt(MqttSettings),
    /// Commands wait in the poll/ack mailbox served at `/command`.
    Mailbox,
    /// Commands are only logged.
    Log,
}

fn default_device_url() -> String {
    "http://192.168.0.100:80/command".to_string()
}

fn default_device_timeout_ms() -> u64 {
    3000
}

/// Bound on a single MQTT publish.
pub const MQTT_PUBLISH_TIMEOUT: Duration = Duration::from_millis(3000);

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig::Http {
            url: default_device_url(),
            timeout_ms: default_device_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EmbeddingConfig {
    Hashing {
        #[serde(default = "default_embedding_dim")]
        dim: usize,
    },
    Http {
        url: String,
        model: String,
        #[serde(default = "default_embedding_dim")]
        dim: usize,
        #[serde(default = "default_embedding_timeout_ms")]
        timeout_ms: u64,
    },
}

fn default_embedding_dim() -> usize {
    256
}

fn default_embedding_timeout_ms() -> u64 {
    5000
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        EmbeddingConfig::Hashing {
            dim: default_embedding_dim(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default)]
    pub recognizer: RecognizerKind,
    #[serde(default)]
    pub speaker: SpeakerKind,
    /// Utterances replayed by the scripted recognizer.
    #[serde(default)]
    pub phrases: Vec<String>,
    #[serde(flatten)]
    pub recognition: RecognizerConfig,
}

/// Reads the YAML config at `path`; a missing file yields the defaults.
pub fn load(path: &Path) -> Result<DaemonConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(DaemonConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config: {}", path.display()))?;
    let cfg: DaemonConfig =
        serde_yaml::from_str(&raw).with_context(|| format!("parsing yaml: {}", path.display()))?;
    Ok(cfg)
}
