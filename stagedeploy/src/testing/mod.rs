//! Testing utilities for stagedeploy.
//!
//! This module provides:
//! - Linear pipeline builders with binding markers already attached
//! - Registries preloaded with coordinates for every fixture stage
//!
//! Pair these with [`crate::deployer::InMemoryDeployer`], which records every
//! call it receives.

mod fixtures;

pub use fixtures::{
    fixture_coordinates, linear_stages, PipelineFixture, FIXTURE_GROUP, FIXTURE_VERSION,
};
