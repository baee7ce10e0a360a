use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use crate::mediation::{MediationEngine, MediationOutcome, OutcomeKind};
use crate::platform::{EventSource, SourceSignal};

/// Totals for one service lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub events: u64,
    pub interruptions: u64,
    /// Events for which a click reached the platform
    pub clicks: u64,
    pub outcomes: BTreeMap<OutcomeKind, u64>,
}

impl ServiceSummary {
    fn record(&mut self, outcome: &MediationOutcome) {
        self.events += 1;
        if outcome.dispatched() {
            self.clicks += 1;
        }
        *self.outcomes.entry(outcome.kind()).or_insert(0) += 1;
    }

    pub fn count(&self, kind: OutcomeKind) -> u64 {
        self.outcomes.get(&kind).copied().unwrap_or(0)
    }

    pub fn clicks_dispatched(&self) -> u64 {
        self.clicks
    }
}

/// Shutdown future for [`MediatorService::run_until`] driven by a signal
/// listener such as `tokio::signal::ctrl_c()`
///
/// A listener that fails to install is logged and never fires, so the service
/// keeps running until its source is exhausted.
pub async fn shutdown_on<F>(listener: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = listener.await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Hosts a mediation engine for the lifetime of the platform service
///
/// Signals are drained strictly one at a time, so the engine is never
/// re-entered while a previous event is still being handled.
pub struct MediatorService<S> {
    engine: Arc<MediationEngine>,
    source: S,
}

impl<S: EventSource> MediatorService<S> {
    pub fn new(engine: Arc<MediationEngine>, source: S) -> Self {
        Self { engine, source }
    }

    pub fn engine(&self) -> &Arc<MediationEngine> {
        &self.engine
    }

    /// Run until the source is exhausted
    pub async fn run(self) -> ServiceSummary {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Run until the source is exhausted or `shutdown` completes
    pub async fn run_until<F>(mut self, shutdown: F) -> ServiceSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = ServiceSummary::default();

        tracing::info!(
            target_package = %self.engine.config().target_package(),
            "Mediator service started"
        );

        loop {
            let signal = tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                signal = self.source.next_signal() => signal,
            };

            match signal {
                Some(SourceSignal::Event { event, window }) => {
                    let outcome = self.engine.handle_event(&event, window);
                    summary.record(&outcome);
                }
                Some(SourceSignal::Interrupted) => {
                    self.engine.on_interrupted();
                    summary.interruptions += 1;
                }
                None => break,
            }
        }

        tracing::info!(
            events = summary.events,
            interruptions = summary.interruptions,
            clicks = summary.clicks_dispatched(),
            "Mediator service stopped"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediationConfig;
    use crate::mediation::UiStateChangeEvent;
    use crate::platform::{ChannelSource, NodeRef, SnapshotNode};
    use crate::telemetry::{BroadcastSink, Telemetry};
    use std::time::Duration;

    fn engine() -> Arc<MediationEngine> {
        Arc::new(MediationEngine::new(MediationConfig::default()))
    }

    #[tokio::test]
    async fn test_channel_source_drives_engine() {
        let (handle, source) = ChannelSource::<NodeRef>::new(8);
        let service = MediatorService::new(engine(), source);
        let task = tokio::spawn(service.run());

        let tree = SnapshotNode::container(vec![SnapshotNode::button("Order")]).into_ref();
        assert!(handle.push_event(UiStateChangeEvent::new("com.gojek.app"), Some(tree.clone())).await);
        assert!(handle.push_event(UiStateChangeEvent::new("com.other.app"), Some(tree.clone())).await);
        assert!(handle.interrupt().await);
        drop(handle);

        let summary = task.await.unwrap();
        assert_eq!(summary.events, 2);
        assert_eq!(summary.interruptions, 1);
        assert_eq!(summary.count(OutcomeKind::Acted), 1);
        assert_eq!(summary.count(OutcomeKind::Skipped), 1);
        assert_eq!(tree.total_clicks(), 1);
    }

    #[tokio::test]
    async fn test_window_is_released_once_event_is_handled() {
        let sink = Arc::new(BroadcastSink::new(8));
        let mut outcomes = sink.subscribe();
        let engine = Arc::new(MediationEngine::with_telemetry(
            MediationConfig::default(),
            Telemetry::new().with_sink(sink.clone()),
        ));

        let (handle, source) = ChannelSource::<NodeRef>::new(8);
        let task = tokio::spawn(MediatorService::new(engine, source).run());

        let tree = SnapshotNode::container(vec![SnapshotNode::button("Pesan")]).into_ref();
        assert!(handle.push_event(UiStateChangeEvent::new("com.gojek.app"), Some(tree.clone())).await);

        let record = outcomes.recv().await.unwrap();
        assert_eq!(record.outcome, MediationOutcome::Acted("Pesan".to_string()));
        // Service is now idle waiting for the next signal
        assert_eq!(Arc::strong_count(&tree), 1);
        assert_eq!(tree.total_clicks(), 1);

        assert!(handle.interrupt().await);
        drop(handle);
        let summary = task.await.unwrap();
        assert_eq!(summary.interruptions, 1);
        assert_eq!(Arc::strong_count(&tree), 1);
    }

    fn failed_listener() -> impl Future<Output = std::io::Result<()>> {
        async { Err(std::io::Error::new(std::io::ErrorKind::Other, "no signal handler")) }
    }

    #[tokio::test]
    async fn test_failed_signal_listener_never_fires() {
        let waited = tokio::time::timeout(Duration::from_millis(20), shutdown_on(failed_listener())).await;
        assert!(waited.is_err());

        assert!(tokio::time::timeout(Duration::from_millis(20), shutdown_on(async { Ok(()) }))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_service_outlives_failed_signal_listener() {
        let (handle, source) = ChannelSource::<NodeRef>::new(8);
        let service = MediatorService::new(engine(), source);
        let task = tokio::spawn(service.run_until(shutdown_on(failed_listener())));

        assert!(handle.push_event(UiStateChangeEvent::new("com.other.app"), None).await);
        drop(handle);

        let summary = task.await.unwrap();
        assert_eq!(summary.events, 1);
        assert_eq!(summary.count(OutcomeKind::Skipped), 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_idle_service() {
        let (_handle, source) = ChannelSource::<NodeRef>::new(1);
        let service = MediatorService::new(engine(), source);

        let summary = service.run_until(async {}).await;
        assert_eq!(summary, ServiceSummary::default());
    }
}
