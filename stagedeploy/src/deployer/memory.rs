//! In-process deployer.

use super::ModuleDeployer;
use crate::core::{DeploymentId, DeploymentState};
use crate::errors::DeployerError;
use crate::planning::DeployInstruction;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::debug;

/// A call received by an [`InMemoryDeployer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployerCall {
    /// `deploy` for the given id.
    Deploy(DeploymentId),
    /// `undeploy` for the given id.
    Undeploy(DeploymentId),
    /// `status` for the given id.
    Status(DeploymentId),
}

/// Calls kept by an [`InMemoryDeployer`] unless configured otherwise.
pub const DEFAULT_CALL_LIMIT: usize = 1024;

/// A deployer that only tracks state.
///
/// Deployed stages report [`DeploymentState::Deployed`] (or the state set
/// with [`InMemoryDeployer::with_deploy_state`]), undeployed stages report
/// [`DeploymentState::Undeployed`] and unseen ids report
/// [`DeploymentState::Unknown`].
///
/// The call log keeps the most recent [`DEFAULT_CALL_LIMIT`] calls; older
/// entries are dropped.
#[derive(Debug)]
pub struct InMemoryDeployer {
    states: DashMap<DeploymentId, DeploymentState>,
    instructions: DashMap<DeploymentId, DeployInstruction>,
    rejected: DashMap<DeploymentId, String>,
    calls: Mutex<VecDeque<DeployerCall>>,
    call_limit: usize,
    deploy_state: DeploymentState,
}

impl Default for InMemoryDeployer {
    fn default() -> Self {
        Self {
            states: DashMap::new(),
            instructions: DashMap::new(),
            rejected: DashMap::new(),
            calls: Mutex::new(VecDeque::new()),
            call_limit: DEFAULT_CALL_LIMIT,
            deploy_state: DeploymentState::Deployed,
        }
    }
}

impl InMemoryDeployer {
    /// Creates an empty deployer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the state a stage enters when deployed.
    #[must_use]
    pub fn with_deploy_state(mut self, state: DeploymentState) -> Self {
        self.deploy_state = state;
        self
    }

    /// Sets how many recent calls are kept. Zero disables the log.
    #[must_use]
    pub fn with_call_limit(mut self, limit: usize) -> Self {
        self.call_limit = limit;
        self
    }

    /// Makes `deploy` fail for the given id.
    pub fn reject(&self, id: DeploymentId, reason: impl Into<String>) {
        self.rejected.insert(id, reason.into());
    }

    /// Overrides the state reported for an id.
    pub fn set_state(&self, id: DeploymentId, state: DeploymentState) {
        self.states.insert(id, state);
    }

    /// Returns the state currently recorded for an id.
    #[must_use]
    pub fn state(&self, id: &DeploymentId) -> DeploymentState {
        self.states.get(id).map_or(DeploymentState::Unknown, |s| *s)
    }

    /// Returns the last instruction deployed under an id.
    #[must_use]
    pub fn instruction(&self, id: &DeploymentId) -> Option<DeployInstruction> {
        self.instructions.get(id).map(|i| i.clone())
    }

    /// Returns the recorded calls, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<DeployerCall> {
        self.calls.lock().iter().cloned().collect()
    }

    /// Returns the ids passed to `deploy`, in order.
    #[must_use]
    pub fn deployed_ids(&self) -> Vec<DeploymentId> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                DeployerCall::Deploy(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of `undeploy` calls received.
    #[must_use]
    pub fn undeploy_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, DeployerCall::Undeploy(_)))
            .count()
    }

    /// Forgets recorded calls, keeping stage states.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: DeployerCall) {
        if self.call_limit == 0 {
            return;
        }
        let mut calls = self.calls.lock();
        while calls.len() >= self.call_limit {
            calls.pop_front();
        }
        calls.push_back(call);
    }
}

#[async_trait]
impl ModuleDeployer for InMemoryDeployer {
    async fn deploy(&self, instruction: &DeployInstruction) -> Result<(), DeployerError> {
        let id = instruction.deployment_id.clone();
        self.record(DeployerCall::Deploy(id.clone()));

        if let Some(reason) = self.rejected.get(&id) {
            self.states.insert(id.clone(), DeploymentState::Failed);
            return Err(DeployerError::rejected(id.to_string(), reason.value().clone()));
        }

        debug!(id = %id, coordinates = %instruction.coordinates, "In-memory deploy");
        self.states.insert(id.clone(), self.deploy_state);
        self.instructions.insert(id, instruction.clone());
        Ok(())
    }

    async fn undeploy(&self, id: &DeploymentId) -> Result<(), DeployerError> {
        self.record(DeployerCall::Undeploy(id.clone()));
        debug!(id = %id, "In-memory undeploy");
        self.states.insert(id.clone(), DeploymentState::Undeployed);
        self.instructions.remove(id);
        Ok(())
    }

    async fn status(&self, id: &DeploymentId) -> Result<DeploymentState, DeployerError> {
        self.record(DeployerCall::Status(id.clone()));
        Ok(self.state(id))
    }
}
