//! Where lifecycle events go.

use super::LifecycleEvent;
use crate::core::DeploymentId;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, Level};

/// Receives lifecycle events from the coordinator.
///
/// Emission never fails; a sink that cannot deliver drops the event.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    async fn emit(&self, event: LifecycleEvent);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: LifecycleEvent) {}
}

/// Writes events to the `tracing` subscriber.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl LoggingEventSink {
    /// Creates a sink logging at `level`; anything but `DEBUG` logs at `INFO`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a sink logging at `DEBUG`.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: LifecycleEvent) {
        let stage = event.deployment_id.as_ref().map(ToString::to_string);
        if self.level == Level::DEBUG {
            debug!(
                event_type = event.event_type,
                pipeline = %event.pipeline,
                stage = ?stage,
                data = %event.data,
                "Lifecycle event"
            );
        } else {
            info!(
                event_type = event.event_type,
                pipeline = %event.pipeline,
                stage = ?stage,
                data = %event.data,
                "Lifecycle event"
            );
        }
    }
}

/// Keeps events in memory for inspection.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<LifecycleEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every event received.
    #[must_use]
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.read().clone()
    }

    /// Returns event type names in arrival order.
    #[must_use]
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.read().iter().map(|e| e.event_type).collect()
    }

    /// Returns how many events of `event_type` arrived.
    #[must_use]
    pub fn count(&self, event_type: &str) -> usize {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    /// Returns the events raised for one stage.
    #[must_use]
    pub fn for_stage(&self, id: &DeploymentId) -> Vec<LifecycleEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.deployment_id.as_ref() == Some(id))
            .cloned()
            .collect()
    }

    /// Returns the number of events held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing has arrived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Drops all held events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: LifecycleEvent) {
        self.events.write().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types;
    use serde_json::json;

    #[tokio::test]
    async fn test_collecting_sink_filters() {
        let sink = CollectingEventSink::new();
        let log = DeploymentId::new("ticktock", "log");
        let time = DeploymentId::new("ticktock", "time");

        sink.emit(LifecycleEvent::stage(types::STAGE_DEPLOY_REQUESTED, &log)).await;
        sink.emit(LifecycleEvent::stage(types::STAGE_DEPLOY_REQUESTED, &time)).await;
        sink.emit(
            LifecycleEvent::pipeline(types::PIPELINE_DEPLOYED, "ticktock")
                .with_data(json!({"stages": 2})),
        )
        .await;

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.count(types::STAGE_DEPLOY_REQUESTED), 2);
        assert_eq!(sink.for_stage(&log).len(), 1);
        assert_eq!(sink.event_types().last(), Some(&types::PIPELINE_DEPLOYED));

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_noop_and_logging_sinks_accept_events() {
        let event = LifecycleEvent::pipeline(types::PIPELINE_UNDEPLOYED, "ticktock");
        tokio_test::block_on(NoOpEventSink.emit(event.clone()));
        tokio_test::block_on(LoggingEventSink::debug().emit(event.clone()));
        tokio_test::block_on(LoggingEventSink::default().emit(event));
    }
}
