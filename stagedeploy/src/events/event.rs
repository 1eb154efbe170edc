//! Lifecycle event record.

use crate::core::DeploymentId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Something that happened to a pipeline or one of its stages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleEvent {
    /// One of the names in [`super::types`].
    pub event_type: &'static str,
    /// The pipeline the event belongs to.
    pub pipeline: String,
    /// The stage, for stage-level events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<DeploymentId>,
    /// When the event was raised.
    pub timestamp: DateTime<Utc>,
    /// Event-specific payload.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl LifecycleEvent {
    /// Creates a pipeline-level event.
    #[must_use]
    pub fn pipeline(event_type: &'static str, pipeline: impl Into<String>) -> Self {
        Self {
            event_type,
            pipeline: pipeline.into(),
            deployment_id: None,
            timestamp: Utc::now(),
            data: Value::Null,
        }
    }

    /// Creates a stage-level event; the pipeline is the id's group.
    #[must_use]
    pub fn stage(event_type: &'static str, id: &DeploymentId) -> Self {
        Self {
            deployment_id: Some(id.clone()),
            ..Self::pipeline(event_type, id.group.clone())
        }
    }

    /// Attaches a payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Renders the event as JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stage_event_takes_pipeline_from_id() {
        let id = DeploymentId::new("ticktock", "log");
        let event = LifecycleEvent::stage("stage.deploy_requested", &id);

        assert_eq!(event.pipeline, "ticktock");
        assert_eq!(event.deployment_id, Some(id));
        assert!(event.data.is_null());
    }

    #[test]
    fn test_to_json_skips_empty_fields() {
        let event = LifecycleEvent::pipeline("pipeline.deployed", "ticktock")
            .with_data(json!({"stages": 2}));
        let rendered = event.to_json();

        assert_eq!(rendered["event_type"], "pipeline.deployed");
        assert_eq!(rendered["data"]["stages"], 2);
        assert!(rendered.get("deployment_id").is_none());
        assert!(rendered.get("timestamp").is_some());
    }
}
