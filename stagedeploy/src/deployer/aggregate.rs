//! Pipeline state aggregation.

use super::ModuleDeployer;
use crate::core::{AggregatedState, DeploymentId, DeploymentState, PipelineDefinition};
use crate::errors::DeployError;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Reduces stage states to one pipeline state.
///
/// Rules, first match wins:
/// 1. A single distinct state is returned as is, except `unknown` which
///    reports as `undeployed`.
/// 2. No states, or any `error`, gives `error`.
/// 3. Any `failed` gives `failed`.
/// 4. Any `deploying` gives `deploying`.
/// 5. Anything else is `partial`.
#[must_use]
pub fn aggregate_states<I>(states: I) -> AggregatedState
where
    I: IntoIterator<Item = DeploymentState>,
{
    let distinct: BTreeSet<DeploymentState> = states.into_iter().collect();

    if distinct.len() == 1 {
        return match distinct.first() {
            Some(DeploymentState::Unknown) => AggregatedState::Undeployed,
            Some(state) => AggregatedState::from(*state),
            None => AggregatedState::Error,
        };
    }

    if distinct.is_empty() || distinct.contains(&DeploymentState::Error) {
        AggregatedState::Error
    } else if distinct.contains(&DeploymentState::Failed) {
        AggregatedState::Failed
    } else if distinct.contains(&DeploymentState::Deploying) {
        AggregatedState::Deploying
    } else {
        AggregatedState::Partial
    }
}

/// Queries the deployer for every stage of a pipeline and aggregates.
#[derive(Clone)]
pub struct StateAggregator {
    deployer: Arc<dyn ModuleDeployer>,
}

impl std::fmt::Debug for StateAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateAggregator").finish_non_exhaustive()
    }
}

impl StateAggregator {
    /// Creates an aggregator over a deployer.
    #[must_use]
    pub fn new(deployer: Arc<dyn ModuleDeployer>) -> Self {
        Self { deployer }
    }

    /// Returns the current state of every stage, keyed by deployment id.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Deployer`] if a status query fails.
    pub async fn stage_states(
        &self,
        pipeline: &PipelineDefinition,
    ) -> Result<BTreeMap<DeploymentId, DeploymentState>, DeployError> {
        let mut states = BTreeMap::new();
        for stage in pipeline.stages() {
            let id = DeploymentId::from_stage(stage);
            let state = self.deployer.status(&id).await?;
            debug!(pipeline = pipeline.name(), label = stage.label(), %state, "Stage state");
            states.insert(id, state);
        }
        Ok(states)
    }

    /// Returns the aggregated state of a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Deployer`] if a status query fails.
    pub async fn aggregate(
        &self,
        pipeline: &PipelineDefinition,
    ) -> Result<AggregatedState, DeployError> {
        let states = self.stage_states(pipeline).await?;
        Ok(aggregate_states(states.into_values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployer::{InMemoryDeployer, MockModuleDeployer};
    use crate::errors::DeployerError;
    use crate::testing::PipelineFixture;
    use DeploymentState::{Deployed, Deploying, Error, Failed, Undeployed, Unknown};

    #[test]
    fn test_single_state_passes_through() {
        assert_eq!(aggregate_states([Deployed]), AggregatedState::Deployed);
        assert_eq!(aggregate_states([Deployed, Deployed]), AggregatedState::Deployed);
        assert_eq!(aggregate_states([Failed]), AggregatedState::Failed);
        assert_eq!(aggregate_states([Deploying]), AggregatedState::Deploying);
        assert_eq!(aggregate_states([Undeployed]), AggregatedState::Undeployed);
        assert_eq!(aggregate_states([Error]), AggregatedState::Error);
    }

    #[test]
    fn test_unknown_reports_undeployed() {
        assert_eq!(aggregate_states([Unknown]), AggregatedState::Undeployed);
        assert_eq!(aggregate_states([Unknown, Unknown]), AggregatedState::Undeployed);
    }

    #[test]
    fn test_empty_is_error() {
        assert_eq!(aggregate_states(Vec::<DeploymentState>::new()), AggregatedState::Error);
    }

    #[test]
    fn test_precedence() {
        assert_eq!(aggregate_states([Deployed, Error]), AggregatedState::Error);
        assert_eq!(aggregate_states([Failed, Error]), AggregatedState::Error);
        assert_eq!(aggregate_states([Deployed, Failed]), AggregatedState::Failed);
        assert_eq!(aggregate_states([Deploying, Failed]), AggregatedState::Failed);
        assert_eq!(aggregate_states([Deploying, Deployed]), AggregatedState::Deploying);
        assert_eq!(aggregate_states([Deployed, Undeployed]), AggregatedState::Partial);
        assert_eq!(aggregate_states([Unknown, Deployed]), AggregatedState::Partial);
    }

    #[tokio::test]
    async fn test_aggregator_queries_each_stage() {
        let fixture = PipelineFixture::linear("ticktock", &["time", "log"]);
        let deployer = Arc::new(InMemoryDeployer::new());
        deployer.set_state(DeploymentId::new("ticktock", "log"), Deployed);

        let aggregator = StateAggregator::new(deployer.clone());
        let states = aggregator.stage_states(&fixture.pipeline).await.unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states[&DeploymentId::new("ticktock", "time")], Unknown);

        assert_eq!(
            aggregator.aggregate(&fixture.pipeline).await.unwrap(),
            AggregatedState::Partial
        );

        deployer.set_state(DeploymentId::new("ticktock", "time"), Deployed);
        assert_eq!(
            aggregator.aggregate(&fixture.pipeline).await.unwrap(),
            AggregatedState::Deployed
        );
    }

    #[tokio::test]
    async fn test_aggregator_propagates_status_failure() {
        let fixture = PipelineFixture::linear("ticktock", &["time", "log"]);
        let mut deployer = MockModuleDeployer::new();
        deployer
            .expect_status()
            .returning(|_| Err(DeployerError::unavailable("connection refused")));

        let aggregator = StateAggregator::new(Arc::new(deployer));
        let err = aggregator.aggregate(&fixture.pipeline).await.unwrap_err();
        assert!(matches!(err, DeployError::Deployer(DeployerError::Unavailable { .. })));
    }
}
