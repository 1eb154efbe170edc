//! Deploy and undeploy over the deployer seam.

use super::ModuleDeployer;
use crate::core::{DeploymentId, PipelineDefinition};
use crate::errors::DeployError;
use crate::events::{types, EventSink, LifecycleEvent, NoOpEventSink};
use crate::planning::DeploymentPlan;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of undeploying one pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndeployReport {
    /// Stages an undeploy call was issued for.
    pub undeployed: Vec<DeploymentId>,
    /// Stages skipped because they were already inactive.
    pub skipped: Vec<DeploymentId>,
}

impl UndeployReport {
    /// Returns the number of undeploy calls issued.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.undeployed.len()
    }
}

/// Hands instructions to the deployer and tears pipelines down.
#[derive(Clone)]
pub struct LifecycleController {
    deployer: Arc<dyn ModuleDeployer>,
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleController").finish_non_exhaustive()
    }
}

impl LifecycleController {
    /// Creates a controller that emits no events.
    #[must_use]
    pub fn new(deployer: Arc<dyn ModuleDeployer>) -> Self {
        Self {
            deployer,
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Issues every instruction of `plan`, in order.
    ///
    /// Stops at the first deployer failure. Instructions already issued are
    /// not rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Deployer`] if the deployer rejects an instruction.
    pub async fn deploy(&self, plan: &DeploymentPlan) -> Result<Vec<DeploymentId>, DeployError> {
        let mut issued = Vec::with_capacity(plan.len());

        for instruction in plan.instructions() {
            let id = &instruction.deployment_id;
            if let Err(e) = self.deployer.deploy(instruction).await {
                warn!(
                    pipeline = %plan.pipeline,
                    stage = %id,
                    issued = issued.len(),
                    error = %e,
                    "Deploy aborted"
                );
                return Err(e.into());
            }

            debug!(
                pipeline = %plan.pipeline,
                stage = %id,
                role = %instruction.role,
                "Deploy requested"
            );
            self.events
                .emit(
                    LifecycleEvent::stage(types::STAGE_DEPLOY_REQUESTED, id).with_data(json!({
                        "plan_id": plan.plan_id.to_string(),
                        "role": instruction.role.to_string(),
                        "coordinates": instruction.coordinates.to_string(),
                    })),
                )
                .await;
            issued.push(id.clone());
        }

        info!(pipeline = %plan.pipeline, stages = issued.len(), "Pipeline deployed");
        self.events
            .emit(
                LifecycleEvent::pipeline(types::PIPELINE_DEPLOYED, plan.pipeline.clone()).with_data(
                    json!({
                        "plan_id": plan.plan_id.to_string(),
                        "stages": issued.len(),
                    }),
                ),
            )
            .await;

        Ok(issued)
    }

    /// Undeploys every stage of `pipeline` that is still active.
    ///
    /// Stages reporting `unknown` or `undeployed` are skipped, so repeating
    /// the call issues no further undeploys.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Deployer`] if a status or undeploy call fails.
    pub async fn undeploy_all(
        &self,
        pipeline: &PipelineDefinition,
    ) -> Result<UndeployReport, DeployError> {
        let mut report = UndeployReport::default();

        for stage in pipeline.stages() {
            let id = DeploymentId::from_stage(stage);
            let state = self.deployer.status(&id).await?;

            if state.is_inactive() {
                debug!(pipeline = pipeline.name(), stage = %id, %state, "Undeploy skipped");
                self.events
                    .emit(
                        LifecycleEvent::stage(types::STAGE_UNDEPLOY_SKIPPED, &id)
                            .with_data(json!({ "state": state })),
                    )
                    .await;
                report.skipped.push(id);
                continue;
            }

            self.deployer.undeploy(&id).await?;
            debug!(pipeline = pipeline.name(), stage = %id, %state, "Undeploy requested");
            self.events
                .emit(
                    LifecycleEvent::stage(types::STAGE_UNDEPLOY_REQUESTED, &id)
                        .with_data(json!({ "previous_state": state })),
                )
                .await;
            report.undeployed.push(id);
        }

        info!(
            pipeline = pipeline.name(),
            undeployed = report.undeployed.len(),
            skipped = report.skipped.len(),
            "Pipeline undeployed"
        );
        self.events
            .emit(
                LifecycleEvent::pipeline(types::PIPELINE_UNDEPLOYED, pipeline.name()).with_data(
                    json!({
                        "undeployed": report.undeployed.len(),
                        "skipped": report.skipped.len(),
                    }),
                ),
            )
            .await;

        Ok(report)
    }
}
