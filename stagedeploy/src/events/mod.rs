//! Lifecycle event emission.
//!
//! This module provides:
//! - [`LifecycleEvent`], one timestamped pipeline or stage event
//! - The [`EventSink`] trait and no-op, logging and collecting sinks
//! - Event type names

mod event;
mod sink;

pub use event::LifecycleEvent;
pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Event type names.
pub mod types {
    /// A deploy instruction was handed to the deployer.
    pub const STAGE_DEPLOY_REQUESTED: &str = "stage.deploy_requested";
    /// An undeploy instruction was handed to the deployer.
    pub const STAGE_UNDEPLOY_REQUESTED: &str = "stage.undeploy_requested";
    /// A stage was already inactive, so no undeploy was issued.
    pub const STAGE_UNDEPLOY_SKIPPED: &str = "stage.undeploy_skipped";
    /// Every instruction of a plan was handed to the deployer.
    pub const PIPELINE_DEPLOYED: &str = "pipeline.deployed";
    /// Every stage of a pipeline was undeployed or already inactive.
    pub const PIPELINE_UNDEPLOYED: &str = "pipeline.undeployed";
    /// A pipeline state was aggregated from its stage states.
    pub const PIPELINE_STATE_COMPUTED: &str = "pipeline.state_computed";
}
