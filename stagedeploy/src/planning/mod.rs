//! Deployment planning.
//!
//! This module provides:
//! - Property merging of scoped overrides
//! - Role classification
//! - Partition propagation across adjacent stages
//! - The planner that ties them together per stage, in deployment order

mod classifier;
mod partition;
mod planner;
mod properties;

pub use classifier::classify;
pub use partition::{
    apply_consumer_properties, apply_producer_properties, has_partition_info, instance_count,
    is_partitioned_consumer, PartitionPropagator, PartitionState,
};
pub use planner::{DeployInstruction, DeploymentPlan, DeploymentPlanner};
pub use properties::{
    merge_properties, merge_properties_with_prefix, parse_deployment_properties,
    DEFAULT_PROPERTY_PREFIX, WILDCARD_SCOPE,
};
