//! The external deployer seam and lifecycle operations over it.
//!
//! This module provides:
//! - The [`ModuleDeployer`] trait implemented by runtime executors
//! - [`InMemoryDeployer`], a local deployer that records every call
//! - [`LifecycleController`] issuing deploy and idempotent undeploy calls
//! - [`aggregate_states`] and [`StateAggregator`] reducing stage states

mod aggregate;
mod lifecycle;
mod memory;

pub use aggregate::{aggregate_states, StateAggregator};
pub use lifecycle::{LifecycleController, UndeployReport};
pub use memory::{DeployerCall, InMemoryDeployer, DEFAULT_CALL_LIMIT};

use crate::core::{DeploymentId, DeploymentState};
use crate::errors::DeployerError;
use crate::planning::DeployInstruction;
use async_trait::async_trait;

/// Runs and stops stages on behalf of the coordinator.
///
/// The deployer owns stage runtime state. Implementations should be
/// idempotent per [`DeploymentId`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModuleDeployer: Send + Sync {
    /// Starts the stage described by `instruction`.
    async fn deploy(&self, instruction: &DeployInstruction) -> Result<(), DeployerError>;

    /// Stops the stage with the given id.
    async fn undeploy(&self, id: &DeploymentId) -> Result<(), DeployerError>;

    /// Reports the current state of the stage with the given id.
    async fn status(&self, id: &DeploymentId) -> Result<DeploymentState, DeployerError>;
}
