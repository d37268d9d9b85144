//! Single-request pipeline: classify, parse, apply to the slot table, drive the device.

use crate::{DispatchError, DispatchResult};
use device_link::{DeviceCommand, DeviceTransport};
use slot_intent::{BatchArgs, CommandParser, Intent, IntentClassifier, ParsedArgs};
use slot_registry::{CommandScheme, DispatchMetrics, SlotStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Delay between consecutive device commands of one request.
    pub pacing: Duration,
    pub scheme: CommandScheme,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(1000),
            scheme: CommandScheme::Positional,
        }
    }
}

/// A mutation already applied to the table, plus what to tell the device.
struct Applied {
    message: String,
    commands: Vec<DeviceCommand>,
}

/// Message and accepted command strings of a successful request.
type Completed = (String, Vec<String>);

/// Owns the slot table and every collaborator needed to serve a command.
pub struct Dispatcher {
    classifier: IntentClassifier,
    parser: CommandParser,
    transport: Arc<dyn DeviceTransport>,
    store: Mutex<SlotStore>,
    /// Serializes device output only; never held together with `store`.
    emission: Mutex<()>,
    config: DispatcherConfig,
    metrics: Option<DispatchMetrics>,
}

impl Dispatcher {
    pub fn new(
        classifier: IntentClassifier,
        parser: CommandParser,
        transport: Arc<dyn DeviceTransport>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            classifier,
            parser,
            transport,
            store: Mutex::new(SlotStore::new()),
            emission: Mutex::new(()),
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: DispatchMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Current slot table, ordered by item name.
    pub async fn slots(&self) -> BTreeMap<String, u32> {
        self.store.lock().await.snapshot()
    }

    /// Handle one single-item command such as "저장 롯데카드 3".
    pub async fn handle(&self, text: &str) -> DispatchResult {
        let intent = match self.classifier.classify(text).await {
            Ok(intent) => intent,
            Err(e) => return self.finish(Intent::Unknown, text, Err(e.into())),
        };
        debug!(%intent, text, "command classified");
        let outcome = self.apply_single(intent, text).await;
        self.finish(intent, text, outcome)
    }

    /// Handle the multi-item form such as "롯데카드 1 민증 2 저장".
    pub async fn handle_batch(&self, text: &str) -> DispatchResult {
        let intent = match self.classifier.classify(text).await {
            Ok(intent) => intent,
            Err(e) => return self.finish(Intent::Unknown, text, Err(e.into())),
        };
        let args = match self.parser.parse_batch(intent, text) {
            Ok(args) => args,
            Err(e) => return self.finish(intent, text, Err(e.into())),
        };
        let intent = args.intent;
        let outcome = self.apply_batch(args).await;
        self.finish(intent, text, outcome)
    }

    async fn apply_single(&self, intent: Intent, text: &str) -> Result<Completed, DispatchError> {
        let args = self.parser.parse(intent, text)?;
        let name = self.parser.canonicalizer().canonicalize(args.item());
        let scheme = &self.config.scheme;

        let mut store = self.store.lock().await;
        let applied = match args {
            ParsedArgs::Save { slot, .. } => {
                let commands = commands_of(scheme, Intent::Save, slot)?;
                if let Some(prev) = store.upsert(&name, slot) {
                    debug!(item = %name, prev, slot, "slot reassigned");
                }
                Applied {
                    message: format!("{name} 슬롯을 {slot}번 위치에 저장했습니다."),
                    commands,
                }
            }
            ParsedArgs::Delete { .. } => {
                let slot = store
                    .get(&name)
                    .ok_or_else(|| DispatchError::SlotNotFound(name.clone()))?;
                let commands = commands_of(scheme, Intent::Delete, slot)?;
                store.remove(&name);
                Applied {
                    message: format!("{name} 슬롯을 삭제했습니다."),
                    commands,
                }
            }
            ParsedArgs::Move { .. } => {
                let slot = store
                    .get(&name)
                    .ok_or_else(|| DispatchError::SlotNotFound(name.clone()))?;
                Applied {
                    message: format!("{name} 슬롯으로 이동합니다."),
                    commands: commands_of(scheme, Intent::Move, slot)?,
                }
            }
        };
        self.record_occupancy(store.len());
        drop(store);

        let sent = self.emit(applied.commands).await?;
        Ok((applied.message, sent))
    }

    async fn apply_batch(&self, args: BatchArgs) -> Result<Completed, DispatchError> {
        let scheme = &self.config.scheme;
        let mut store = self.store.lock().await;
        let mut touched = Vec::new();
        let mut missing = Vec::new();
        let mut commands = Vec::new();

        for (name, spoken_slot) in &args.entries {
            let slot = match args.intent {
                Intent::Save => *spoken_slot,
                // Delete entries carry a placeholder and move reads the table.
                _ => match store.get(name) {
                    Some(slot) => slot,
                    None => {
                        missing.push(name.clone());
                        continue;
                    }
                },
            };
            let command = match scheme.plan(args.intent, slot) {
                Ok(plan) => plan.into_iter().next().map(|(_, cmd)| cmd),
                Err(e) => {
                    warn!(item = %name, slot, error = %e, "batch entry skipped");
                    continue;
                }
            };
            match args.intent {
                Intent::Save => {
                    store.upsert(name, slot);
                }
                Intent::Delete => {
                    store.remove(name);
                }
                _ => {}
            }
            touched.push(name.clone());
            commands.extend(command);
        }

        if touched.is_empty() {
            return Err(DispatchError::SlotNotFound(missing.join(", ")));
        }
        if !missing.is_empty() {
            info!(missing = ?missing, "batch items without a slot were ignored");
        }
        self.record_occupancy(store.len());
        drop(store);

        let sent = self.emit(commands).await?;
        let verb = match args.intent {
            Intent::Save => "저장",
            Intent::Delete => "삭제",
            _ => "이동",
        };
        Ok((format!("슬롯 정보를 {verb}했습니다."), sent))
    }

    /// Send in order with pacing between commands. Only a failure of the
    /// last command fails the request. Commands of one request reach the
    /// device back to back.
    async fn emit(&self, commands: Vec<DeviceCommand>) -> Result<Vec<String>, DispatchError> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }
        let _emitting = self.emission.lock().await;
        let last = commands.len().saturating_sub(1);
        let mut sent = Vec::with_capacity(commands.len());
        for (i, command) in commands.into_iter().enumerate() {
            if i > 0 && !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }
            match self.transport.send(&command).await {
                Ok(()) => {
                    if let Some(m) = &self.metrics {
                        m.device_commands.inc();
                    }
                    debug!(transport = self.transport.name(), %command, "device command sent");
                    sent.push(command.into_inner());
                }
                Err(e) => {
                    if let Some(m) = &self.metrics {
                        m.transport_failures.inc();
                    }
                    warn!(transport = self.transport.name(), %command, error = %e, "device command failed");
                    if i == last {
                        return Err(e.into());
                    }
                }
            }
        }
        Ok(sent)
    }

    fn record_occupancy(&self, occupied: usize) {
        if let Some(m) = &self.metrics {
            m.occupied_slots.set(i64::try_from(occupied).unwrap_or(i64::MAX));
        }
    }

    fn finish(
        &self,
        intent: Intent,
        text: &str,
        outcome: Result<Completed, DispatchError>,
    ) -> DispatchResult {
        if let Some(m) = &self.metrics {
            m.requests
                .with_label_values(&[intent.to_string().as_str()])
                .inc();
        }
        match outcome {
            Ok((message, commands)) => {
                info!(%intent, commands = ?commands, "{message}");
                DispatchResult::success(intent, message, commands)
            }
            Err(e) => {
                if let Some(m) = &self.metrics {
                    m.failures.with_label_values(&[e.kind().as_str()]).inc();
                }
                warn!(%intent, text, error = %e, "command failed");
                DispatchResult::failure(intent, &e)
            }
        }
    }
}

fn commands_of(
    scheme: &CommandScheme,
    intent: Intent,
    slot: u32,
) -> Result<Vec<DeviceCommand>, DispatchError> {
    Ok(scheme
        .plan(intent, slot)?
        .into_iter()
        .map(|(_, cmd)| cmd)
        .collect())
}
