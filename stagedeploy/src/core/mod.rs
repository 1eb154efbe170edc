//! Core domain model types for stagedeploy.
//!
//! This module contains the immutable inputs and derived values the rest of
//! the crate works with:
//! - Stage and pipeline definitions
//! - Artifact coordinates and types
//! - Stage roles and runtime/aggregated states
//! - Well-known binding and partitioning keys

pub mod binding;
mod coordinates;
mod pipeline;
mod stage;
mod status;

pub use coordinates::{ArtifactCoordinates, DEFAULT_EXTENSION};
pub use pipeline::{DeploymentId, DeploymentProperties, PipelineDefinition};
pub use stage::{StageDefinition, StageDefinitionBuilder, StageParameters};
pub use status::{AggregatedState, ArtifactType, DeploymentState, StageRole};
