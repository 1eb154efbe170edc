//! # Stagedeploy
//!
//! Deployment planning and state aggregation for stage pipelines.
//!
//! A pipeline is an ordered chain of stages (sources, processors, sinks)
//! declared in data-flow order. Stagedeploy turns such a pipeline into
//! per-stage deployment instructions and reduces the runtime states the
//! deployer reports back into a single pipeline state:
//!
//! - **Coordinate resolution**: look up each stage's runnable artifact by
//!   `(name, role)` in an artifact registry
//! - **Property merging**: combine `stage.*.` and `stage.<label>.` overrides
//! - **Role classification**: infer source/processor/sink from bindings
//! - **Partition propagation**: wire partitioned producers to consumers in
//!   a single backward walk
//! - **Lifecycle**: idempotent deploy/undeploy through a pluggable deployer
//! - **State aggregation**: one pipeline state from many stage states
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stagedeploy::prelude::*;
//!
//! let pipeline = PipelineDefinition::new("ticktock", "time | log", vec![
//!     StageDefinition::builder("time").output_binding("ticktock.0").build(),
//!     StageDefinition::builder("log").input_binding("ticktock.0").build(),
//! ])?;
//!
//! let coordinator = PipelineCoordinator::new(registry, deployer);
//! coordinator.deploy(&pipeline, &DeploymentProperties::new()).await?;
//! let state = coordinator.status(&pipeline).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod coordinator;
pub mod core;
pub mod deployer;
pub mod errors;
pub mod events;
pub mod observability;
pub mod planning;
pub mod registry;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{CoordinatorConfig, LoggingConfig};
    pub use crate::coordinator::{PipelineCoordinator, PipelineStatus};
    pub use crate::core::{
        AggregatedState, ArtifactCoordinates, ArtifactType, DeploymentId,
        DeploymentProperties, DeploymentState, PipelineDefinition, StageDefinition,
        StageRole,
    };
    pub use crate::deployer::{
        aggregate_states, InMemoryDeployer, LifecycleController, ModuleDeployer,
        StateAggregator,
    };
    pub use crate::errors::{DeployError, DeployerError, PipelineValidationError};
    pub use crate::events::{
        CollectingEventSink, EventSink, LifecycleEvent, LoggingEventSink, NoOpEventSink,
    };
    pub use crate::planning::{
        classify, merge_properties, parse_deployment_properties, DeployInstruction,
        DeploymentPlan, DeploymentPlanner,
    };
    pub use crate::registry::{
        ArtifactRegistration, ArtifactRegistry, CoordinateResolver, InMemoryArtifactRegistry,
    };
}
