//! Deployment planning.

use super::{classify, merge_properties_with_prefix, PartitionPropagator, DEFAULT_PROPERTY_PREFIX};
use crate::config::CoordinatorConfig;
use crate::core::{
    binding, ArtifactCoordinates, DeploymentId, DeploymentProperties, PipelineDefinition,
    StageDefinition, StageRole,
};
use crate::errors::DeployError;
use crate::registry::{ArtifactRegistry, CoordinateResolver};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Everything the deployer needs to start one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployInstruction {
    /// Identity of the stage instance.
    pub deployment_id: DeploymentId,
    /// The stage, with `includes` rewritten to canonical coordinates.
    pub stage: StageDefinition,
    /// The classified role.
    pub role: StageRole,
    /// Where the stage's artifact lives.
    pub coordinates: ArtifactCoordinates,
    /// Final deployment properties.
    pub properties: DeploymentProperties,
}

/// Ordered deploy instructions for one pipeline, sinks first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentPlan {
    /// Unique id of this planning pass, for log correlation.
    pub plan_id: Uuid,
    /// The planned pipeline.
    pub pipeline: String,
    /// When the plan was computed.
    pub created_at: DateTime<Utc>,
    /// Instructions in deployment order.
    pub instructions: Vec<DeployInstruction>,
}

impl DeploymentPlan {
    /// Returns the instructions in deployment order.
    #[must_use]
    pub fn instructions(&self) -> &[DeployInstruction] {
        &self.instructions
    }

    /// Returns the instruction for a stage label.
    #[must_use]
    pub fn instruction(&self, label: &str) -> Option<&DeployInstruction> {
        self.instructions.iter().find(|i| i.stage.label() == label)
    }

    /// Returns the number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the plan has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl IntoIterator for DeploymentPlan {
    type Item = DeployInstruction;
    type IntoIter = std::vec::IntoIter<DeployInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.into_iter()
    }
}

/// Computes deploy instructions for pipelines.
///
/// Planning only reads the registry. Coordinates and properties are computed
/// fresh on every call.
#[derive(Clone)]
pub struct DeploymentPlanner {
    registry: Arc<dyn ArtifactRegistry>,
    property_prefix: String,
    includes_parameter: String,
    propagator: PartitionPropagator,
}

impl std::fmt::Debug for DeploymentPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentPlanner")
            .field("property_prefix", &self.property_prefix)
            .field("includes_parameter", &self.includes_parameter)
            .field("propagator", &self.propagator)
            .finish_non_exhaustive()
    }
}

impl DeploymentPlanner {
    /// Creates a planner with default settings.
    #[must_use]
    pub fn new(registry: Arc<dyn ArtifactRegistry>) -> Self {
        Self {
            registry,
            property_prefix: DEFAULT_PROPERTY_PREFIX.to_string(),
            includes_parameter: binding::INCLUDES.to_string(),
            propagator: PartitionPropagator::default(),
        }
    }

    /// Applies prefix, includes and partitioning settings from a config.
    #[must_use]
    pub fn with_config(mut self, config: &CoordinatorConfig) -> Self {
        self.property_prefix.clone_from(&config.property_prefix);
        self.includes_parameter.clone_from(&config.includes_parameter);
        self.propagator = PartitionPropagator::new(&config.default_partition_key_expression);
        self
    }

    /// Plans the deployment of `pipeline` with the given overrides.
    ///
    /// # Errors
    ///
    /// Any classification, lookup, library or property error aborts the
    /// whole pass; no partial plan is returned.
    pub fn plan(
        &self,
        pipeline: &PipelineDefinition,
        overrides: &DeploymentProperties,
    ) -> Result<DeploymentPlan, DeployError> {
        let plan_id = Uuid::new_v4();
        let span = tracing::info_span!("plan", pipeline = pipeline.name(), %plan_id);
        let _guard = span.enter();

        let resolver = CoordinateResolver::new(self.registry.as_ref());
        let stages: Vec<&StageDefinition> = pipeline.deployment_order().collect();

        let mut resolved = Vec::with_capacity(stages.len());
        let mut properties = Vec::with_capacity(stages.len());
        for stage in &stages {
            let role = classify(stage)?;
            let coordinates = resolver.resolve(stage.name(), role)?;
            resolved.push((role, coordinates));
            properties.push(merge_properties_with_prefix(
                stage,
                overrides,
                &self.property_prefix,
            ));
        }

        self.propagator.propagate(&stages, &mut properties)?;

        let instructions = stages
            .into_iter()
            .zip(resolved)
            .zip(properties)
            .map(|((stage, (role, coordinates)), properties)| {
                let stage = self.resolve_includes(stage, &resolver)?;
                tracing::debug!(
                    stage = stage.label(),
                    %role,
                    %coordinates,
                    property_count = properties.len(),
                    "Planned stage"
                );
                Ok(DeployInstruction {
                    deployment_id: DeploymentId::from_stage(&stage),
                    stage,
                    role,
                    coordinates,
                    properties,
                })
            })
            .collect::<Result<Vec<_>, DeployError>>()?;

        tracing::info!(stages = instructions.len(), "Planned pipeline deployment");

        Ok(DeploymentPlan {
            plan_id,
            pipeline: pipeline.name().to_string(),
            created_at: Utc::now(),
            instructions,
        })
    }

    fn resolve_includes(
        &self,
        stage: &StageDefinition,
        resolver: &CoordinateResolver<'_>,
    ) -> Result<StageDefinition, DeployError> {
        match stage.parameter(&self.includes_parameter) {
            None => Ok(stage.clone()),
            Some(includes) => {
                let rewritten = resolver.resolve_includes(includes)?;
                Ok(stage.with_parameter(self.includes_parameter.clone(), rewritten))
            }
        }
    }
}
