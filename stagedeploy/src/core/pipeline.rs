//! Pipeline definitions and deployment identities.

use super::StageDefinition;
use crate::errors::PipelineValidationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Flat string properties, either pipeline-wide overrides or per-stage
/// deployment properties.
pub type DeploymentProperties = BTreeMap<String, String>;

/// A named, ordered chain of stages in data-flow order (source first).
///
/// Deserialization goes through [`PipelineDefinition::new`], so decoded
/// pipelines are validated and their stages grouped like built ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PipelineDefinitionData")]
pub struct PipelineDefinition {
    name: String,
    text: String,
    stages: Vec<StageDefinition>,
}

#[derive(Deserialize)]
struct PipelineDefinitionData {
    name: String,
    #[serde(default)]
    text: String,
    stages: Vec<StageDefinition>,
}

impl TryFrom<PipelineDefinitionData> for PipelineDefinition {
    type Error = PipelineValidationError;

    fn try_from(data: PipelineDefinitionData) -> Result<Self, Self::Error> {
        Self::new(data.name, data.text, data.stages)
    }
}

impl PipelineDefinition {
    /// Creates a pipeline from already-parsed stages.
    ///
    /// Every stage is assigned to the pipeline's group.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, there are no stages, or two
    /// stages share a label.
    pub fn new(
        name: impl Into<String>,
        text: impl Into<String>,
        stages: Vec<StageDefinition>,
    ) -> Result<Self, PipelineValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PipelineValidationError::new(
                "Pipeline name cannot be empty or whitespace-only",
            ));
        }

        if stages.is_empty() {
            return Err(PipelineValidationError::new(format!(
                "Pipeline '{name}' has no stages"
            )));
        }

        let mut seen = HashSet::new();
        for stage in &stages {
            if !seen.insert(stage.label()) {
                return Err(PipelineValidationError::new(format!(
                    "Label '{}' is used by more than one stage in pipeline '{name}'",
                    stage.label()
                ))
                .with_stages(vec![stage.label().to_string()]));
            }
        }

        let stages = stages.into_iter().map(|s| s.in_group(&name)).collect();

        Ok(Self {
            name,
            text: text.into(),
            stages,
        })
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the original pipeline text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the stages in data-flow order.
    #[must_use]
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Iterates stages in deployment order: sinks first, sources last.
    pub fn deployment_order(&self) -> impl ExactSizeIterator<Item = &StageDefinition> + '_ {
        self.stages.iter().rev()
    }

    /// Finds a stage by label.
    #[must_use]
    pub fn stage(&self, label: &str) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.label() == label)
    }
}

/// Identifies one deployed stage to the deployer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeploymentId {
    /// The pipeline name.
    pub group: String,
    /// The stage label.
    pub label: String,
}

impl DeploymentId {
    /// Creates a deployment id.
    #[must_use]
    pub fn new(group: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            label: label.into(),
        }
    }

    /// Derives the id of a stage from its group and label.
    #[must_use]
    pub fn from_stage(stage: &StageDefinition) -> Self {
        Self::new(stage.group(), stage.label())
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stages() -> Vec<StageDefinition> {
        vec![
            StageDefinition::builder("time").output_binding("ticktock.0").build(),
            StageDefinition::builder("filter").input_binding("ticktock.0").output_binding("ticktock.1").build(),
            StageDefinition::builder("log").input_binding("ticktock.1").build(),
        ]
    }

    #[test]
    fn test_pipeline_creation_assigns_group() {
        let pipeline = PipelineDefinition::new("ticktock", "time | filter | log", stages()).unwrap();

        assert_eq!(pipeline.name(), "ticktock");
        assert_eq!(pipeline.text(), "time | filter | log");
        assert_eq!(pipeline.stage_count(), 3);
        assert!(pipeline.stages().iter().all(|s| s.group() == "ticktock"));
    }

    #[test]
    fn test_deployment_order_is_reversed() {
        let pipeline = PipelineDefinition::new("ticktock", "", stages()).unwrap();

        let order: Vec<&str> = pipeline.deployment_order().map(StageDefinition::label).collect();
        assert_eq!(order, vec!["log", "filter", "time"]);

        let flow: Vec<&str> = pipeline.stages().iter().map(StageDefinition::label).collect();
        let mut reversed = order.clone();
        reversed.reverse();
        assert_eq!(flow, reversed);
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(PipelineDefinition::new("  ", "", stages()).is_err());
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        assert!(PipelineDefinition::new("empty", "", Vec::new()).is_err());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let dup = vec![
            StageDefinition::builder("time").output_binding("x.0").build(),
            StageDefinition::builder("log").input_binding("x.0").output_binding("x.1").build(),
            StageDefinition::builder("log").input_binding("x.1").build(),
        ];

        let err = PipelineDefinition::new("dup", "", dup).unwrap_err();
        assert_eq!(err.stages, vec!["log".to_string()]);
    }

    #[test]
    fn test_deserialize_assigns_group() {
        let json = r#"{
            "name": "ticktock",
            "text": "time | log",
            "stages": [
                {"name": "time", "label": "time", "parameters": {"bindings.output": "ticktock.0"}},
                {"name": "log", "label": "log", "parameters": {"bindings.input": "ticktock.0"}}
            ]
        }"#;

        let pipeline: PipelineDefinition = serde_json::from_str(json).unwrap();
        let ids: Vec<String> = pipeline
            .stages()
            .iter()
            .map(|s| DeploymentId::from_stage(s).to_string())
            .collect();
        assert_eq!(ids, vec!["ticktock.time", "ticktock.log"]);
    }

    #[test]
    fn test_serde_round_trip_keeps_group() {
        let pipeline = PipelineDefinition::new("ticktock", "time | filter | log", stages()).unwrap();

        let json = serde_json::to_string(&pipeline).unwrap();
        let decoded: PipelineDefinition = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, pipeline);
        assert!(decoded.stages().iter().all(|s| s.group() == "ticktock"));
    }

    #[test]
    fn test_deserialize_rejects_duplicate_labels() {
        let json = r#"{
            "name": "ticktock",
            "text": "time | log",
            "stages": [
                {"name": "time", "label": "x", "parameters": {"bindings.output": "ticktock.0"}},
                {"name": "log", "label": "x", "parameters": {"bindings.input": "ticktock.0"}}
            ]
        }"#;

        let err = serde_json::from_str::<PipelineDefinition>(json).unwrap_err();
        assert!(err.to_string().contains("Label 'x'"));
    }

    #[test]
    fn test_deserialize_rejects_blank_name() {
        let json = r#"{"name": " ", "stages": [{"name": "time", "label": "time"}]}"#;
        assert!(serde_json::from_str::<PipelineDefinition>(json).is_err());
    }

    #[test]
    fn test_deployment_id() {
        let pipeline = PipelineDefinition::new("ticktock", "", stages()).unwrap();
        let id = DeploymentId::from_stage(pipeline.stage("log").unwrap());

        assert_eq!(id, DeploymentId::new("ticktock", "log"));
        assert_eq!(id.to_string(), "ticktock.log");
    }
}
