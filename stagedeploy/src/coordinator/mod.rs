//! Pipeline-level deploy, undeploy and status.
//!
//! [`PipelineCoordinator`] ties planning, lifecycle and aggregation together
//! behind the three operations an API layer needs.


use crate::config::CoordinatorConfig;
use crate::core::{
    AggregatedState, DeploymentId, DeploymentProperties, DeploymentState, PipelineDefinition,
};
use crate::deployer::{
    aggregate_states, LifecycleController, ModuleDeployer, StateAggregator, UndeployReport,
};
use crate::errors::DeployError;
use crate::events::{types, EventSink, LifecycleEvent, NoOpEventSink};
use crate::observability::OperationTimer;
use crate::planning::{parse_deployment_properties, DeploymentPlan, DeploymentPlanner};
use crate::registry::ArtifactRegistry;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Aggregated state of a pipeline with the stage states it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStatus {
    /// The pipeline name.
    pub pipeline: String,
    /// The aggregated state.
    pub state: AggregatedState,
    /// State of each stage, keyed by deployment id.
    pub stage_states: BTreeMap<DeploymentId, DeploymentState>,
}

impl PipelineStatus {
    /// Returns the lowercase name of the aggregated state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.state.as_str()
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plans, deploys, undeploys and reports on pipelines.
///
/// The coordinator holds no per-pipeline state. Concurrent operations on
/// the same pipeline must be serialized by the caller.
#[derive(Clone)]
pub struct PipelineCoordinator {
    planner: DeploymentPlanner,
    lifecycle: LifecycleController,
    aggregator: StateAggregator,
    events: Arc<dyn EventSink>,
    config: CoordinatorConfig,
}

impl fmt::Debug for PipelineCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineCoordinator")
            .field("planner", &self.planner)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PipelineCoordinator {
    /// Creates a coordinator with default configuration.
    #[must_use]
    pub fn new(registry: Arc<dyn ArtifactRegistry>, deployer: Arc<dyn ModuleDeployer>) -> Self {
        Self {
            planner: DeploymentPlanner::new(registry),
            lifecycle: LifecycleController::new(deployer.clone()),
            aggregator: StateAggregator::new(deployer),
            events: Arc::new(NoOpEventSink),
            config: CoordinatorConfig::default(),
        }
    }

    /// Applies a configuration.
    #[must_use]
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.planner = self.planner.with_config(&config);
        self.config = config;
        self
    }

    /// Sets the sink receiving lifecycle events.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.lifecycle = self.lifecycle.with_event_sink(events.clone());
        self.events = events;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Computes deploy instructions without touching the deployer.
    pub fn plan(
        &self,
        pipeline: &PipelineDefinition,
        overrides: &DeploymentProperties,
    ) -> Result<DeploymentPlan, DeployError> {
        self.planner.plan(pipeline, overrides)
    }

    /// Plans `pipeline` and hands every instruction to the deployer.
    ///
    /// A planning error issues no deployer call. A deployer error stops the
    /// remaining instructions; stages already deployed stay deployed.
    pub async fn deploy(
        &self,
        pipeline: &PipelineDefinition,
        overrides: &DeploymentProperties,
    ) -> Result<DeploymentPlan, DeployError> {
        let timer = OperationTimer::start("deploy");
        let plan = self.planner.plan(pipeline, overrides).map_err(|e| {
            warn!(pipeline = pipeline.name(), code = e.code(), error = %e, "Planning failed");
            e
        })?;

        self.lifecycle.deploy(&plan).await?;
        info!(
            pipeline = pipeline.name(),
            plan_id = %plan.plan_id,
            duration_ms = timer.elapsed_ms(),
            "Deploy complete"
        );
        Ok(plan)
    }

    /// Deploys with overrides given as `key=value,key=value`.
    ///
    /// `None` or an empty string means no overrides.
    pub async fn deploy_with_properties_str(
        &self,
        pipeline: &PipelineDefinition,
        properties: Option<&str>,
    ) -> Result<DeploymentPlan, DeployError> {
        let overrides = parse_deployment_properties(properties.unwrap_or_default())?;
        self.deploy(pipeline, &overrides).await
    }

    /// Undeploys every active stage of `pipeline`.
    pub async fn undeploy(
        &self,
        pipeline: &PipelineDefinition,
    ) -> Result<UndeployReport, DeployError> {
        let timer = OperationTimer::start("undeploy");
        let report = self.lifecycle.undeploy_all(pipeline).await?;
        debug!(
            pipeline = pipeline.name(),
            duration_ms = timer.elapsed_ms(),
            "Undeploy complete"
        );
        Ok(report)
    }

    /// Undeploys several pipelines in turn, stopping at the first error.
    pub async fn undeploy_pipelines<'a, I>(&self, pipelines: I) -> Result<usize, DeployError>
    where
        I: IntoIterator<Item = &'a PipelineDefinition>,
    {
        let mut issued = 0;
        for pipeline in pipelines {
            issued += self.undeploy(pipeline).await?.issued();
        }
        Ok(issued)
    }

    /// Queries every stage and aggregates the pipeline state.
    pub async fn status(
        &self,
        pipeline: &PipelineDefinition,
    ) -> Result<PipelineStatus, DeployError> {
        let stage_states = self.aggregator.stage_states(pipeline).await?;
        let state = aggregate_states(stage_states.values().copied());

        debug!(pipeline = pipeline.name(), %state, stages = ?stage_states, "Pipeline state computed");
        self.events
            .emit(
                LifecycleEvent::pipeline(types::PIPELINE_STATE_COMPUTED, pipeline.name())
                    .with_data(json!({ "state": state })),
            )
            .await;

        Ok(PipelineStatus {
            pipeline: pipeline.name().to_string(),
            state,
            stage_states,
        })
    }
}
