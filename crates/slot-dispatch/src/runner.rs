use crate::{DispatchError, DispatchResult, Dispatcher};
use slot_intent::Intent;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Runs each request on its own task and waits for it with a bound.
///
/// A request that outlives the bound is reported as timed out, but its task
/// is not cancelled: the slot table may still change once it finishes.
#[derive(Clone)]
pub struct RequestRunner {
    dispatcher: Arc<Dispatcher>,
    timeout: Duration,
}

impl RequestRunner {
    pub fn new(dispatcher: Arc<Dispatcher>, timeout: Duration) -> Self {
        Self {
            dispatcher,
            timeout,
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn submit(&self, text: impl Into<String>) -> DispatchResult {
        let dispatcher = self.dispatcher.clone();
        let text = text.into();
        self.run(tokio::spawn(async move { dispatcher.handle(&text).await }))
            .await
    }

    pub async fn submit_batch(&self, text: impl Into<String>) -> DispatchResult {
        let dispatcher = self.dispatcher.clone();
        let text = text.into();
        self.run(tokio::spawn(async move { dispatcher.handle_batch(&text).await }))
            .await
    }

    async fn run(&self, task: tokio::task::JoinHandle<DispatchResult>) -> DispatchResult {
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => {
                warn!(error = %join, "dispatch task failed");
                DispatchResult::failure(Intent::Unknown, &DispatchError::Aborted(join.to_string()))
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "dispatch timed out; task left running");
                DispatchResult::failure(Intent::Unknown, &DispatchError::Timeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DispatcherConfig, ErrorKind};
    use async_trait::async_trait;
    use device_link::{DeviceCommand, DeviceTransport, MockTransport};
    use slot_intent::{default_templates, Canonicalizer, CommandParser, HashingEmbedder, IntentClassifier};
    use slot_registry::CommandScheme;

    /// Accepts every command after a fixed delay.
    struct SlowTransport {
        delay: Duration,
        inner: MockTransport,
    }

    #[async_trait]
    impl DeviceTransport for SlowTransport {
        async fn send(&self, command: &DeviceCommand) -> device_link::Result<()> {
            tokio::time::sleep(self.delay).await;
            self.inner.send(command).await
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    async fn runner(transport: Arc<dyn DeviceTransport>, timeout: Duration) -> RequestRunner {
        let classifier =
            IntentClassifier::new(Arc::new(HashingEmbedder::default()), default_templates())
                .await
                .unwrap();
        let parser = CommandParser::new(Canonicalizer::default()).unwrap();
        let config = DispatcherConfig {
            pacing: Duration::ZERO,
            scheme: CommandScheme::Positional,
        };
        let dispatcher = Dispatcher::new(classifier, parser, transport, config);
        RequestRunner::new(Arc::new(dispatcher), timeout)
    }

    #[tokio::test]
    async fn fast_request_returns_its_result() {
        let r = runner(Arc::new(MockTransport::new()), Duration::from_secs(5)).await;
        let result = r.submit("저장 롯데카드 1").await;
        assert!(result.is_success());
        let result = r.submit_batch("롯데카드 1 이동").await;
        assert!(result.is_success());
        assert_eq!(result.commands, vec!["M1000;"]);
    }

    #[tokio::test]
    async fn slow_request_times_out_but_still_completes() {
        let transport = Arc::new(SlowTransport {
            delay: Duration::from_millis(150),
            inner: MockTransport::new(),
        });
        let r = runner(transport, Duration::from_millis(50)).await;
        let result = r.submit("저장 삼성카드 2").await;
        assert_eq!(result.error, Some(ErrorKind::Timeout));
        assert_eq!(result.message, "처리 시간이 초과되었습니다.");

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(r.dispatcher().slots().await.get("삼성카드"), Some(&2));
    }
}
