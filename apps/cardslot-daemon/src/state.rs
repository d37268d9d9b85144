use crate::config::{DaemonConfig, EmbeddingConfig, TransportConfig, MQTT_PUBLISH_TIMEOUT};
use anyhow::{anyhow, Context, Result};
use device_link::{
    CommandMailbox, DeviceTransport, HttpTransport, LogTransport, MailboxTransport, MqttTransport,
};
use slot_dispatch::{Dispatcher, DispatcherConfig, RequestRunner, VoiceSession};
use slot_intent::{
    Canonicalizer, CommandParser, EmbeddingProvider, HashingEmbedder, HttpEmbeddingProvider,
    IntentClassifier,
};
use slot_registry::MetricsHub;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use voice_local::plugin::{new_recognizer, new_speaker};
use voice_local::SerializedSpeaker;

/// Everything the HTTP handlers share.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<VoiceSession>,
    pub mailbox: Arc<CommandMailbox>,
    pub metrics: MetricsHub,
}

impl AppState {
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        self.session.runner().dispatcher()
    }
}

/// Wire every collaborator once from config. Must run inside a tokio runtime.
pub async fn build(cfg: &DaemonConfig) -> Result<AppState> {
    let metrics = MetricsHub::new().map_err(|e| anyhow!("failed to create metrics: {e}"))?;
    let mailbox = Arc::new(CommandMailbox::new());

    let transport: Arc<dyn DeviceTransport> = match &cfg.transport {
        TransportConfig::Http { url, timeout_ms } => Arc::new(
            HttpTransport::new(url.clone(), Duration::from_millis(*timeout_ms))
                .context("creating HTTP device transport")?,
        ),
        TransportConfig::Mqtt(settings) => {
            Arc::new(MqttTransport::connect(settings, MQTT_PUBLISH_TIMEOUT))
        }
        TransportConfig::Mailbox => Arc::new(MailboxTransport::new(mailbox.clone())),
        TransportConfig::Log => Arc::new(LogTransport),
    };

    let provider: Arc<dyn EmbeddingProvider> = match &cfg.embedding {
        EmbeddingConfig::Hashing { dim } => Arc::new(HashingEmbedder::new(*dim)),
        EmbeddingConfig::Http {
            url,
            model,
            dim,
            timeout_ms,
        } => Arc::new(
            HttpEmbeddingProvider::new(
                url.clone(),
                model.clone(),
                *dim,
                Duration::from_millis(*timeout_ms),
            )
            .context("creating embedding client")?,
        ),
    };

    let classifier = IntentClassifier::new(provider.clone(), cfg.templates.clone())
        .await
        .context("embedding intent templates")?;
    let parser = CommandParser::new(Canonicalizer::new(cfg.synonyms.clone()))
        .context("building item patterns")?;
    let dispatcher = Dispatcher::new(
        classifier,
        parser,
        transport.clone(),
        DispatcherConfig {
            pacing: cfg.pacing(),
            scheme: cfg.scheme.clone(),
        },
    )
    .with_metrics(metrics.dispatch.clone());
    let runner = RequestRunner::new(Arc::new(dispatcher), cfg.request_timeout());

    let recognizer = new_recognizer(cfg.voice.recognizer, cfg.voice.phrases.clone())
        .map_err(|e| anyhow!("failed to create recognizer: {e}"))?;
    let speaker = new_speaker(cfg.voice.speaker).map_err(|e| anyhow!("failed to create speaker: {e}"))?;
    let session = VoiceSession::new(
        runner,
        recognizer,
        SerializedSpeaker::new(speaker),
        &cfg.voice.recognition,
    )
    .with_batch(cfg.batch_voice);

    info!(
        transport = transport.name(),
        embedding = provider.name(),
        scheme = ?cfg.scheme,
        batch_voice = cfg.batch_voice,
        "dispatcher ready"
    );

    Ok(AppState {
        session: Arc::new(session),
        mailbox,
        metrics,
    })
}
