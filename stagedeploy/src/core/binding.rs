//! Well-known parameter and property keys.
//!
//! Stage parameters carry the binding markers the pipeline parser attaches.
//! Deployment properties carry partitioning hints supplied by the user and
//! the derived properties the planner injects for the deployer.

/// Parameter marking a stage that consumes from an input binding.
pub const INPUT_BINDING: &str = "bindings.input";
/// Parameter marking a stage that publishes to an output binding.
pub const OUTPUT_BINDING: &str = "bindings.output";

/// Number of instances to deploy for a stage.
pub const COUNT: &str = "count";
/// User flag declaring the stage a partitioned consumer.
pub const PARTITIONED: &str = "partitioned";
/// Expression computing the partition key of a record.
pub const PARTITION_KEY_EXPRESSION: &str = "partitionKeyExpression";
/// Class extracting the partition key of a record.
pub const PARTITION_KEY_EXTRACTOR_CLASS: &str = "partitionKeyExtractorClass";
/// Class selecting the partition for a key.
pub const PARTITION_SELECTOR_CLASS: &str = "partitionSelectorClass";
/// Expression selecting the partition for a key.
pub const PARTITION_SELECTOR_EXPRESSION: &str = "partitionSelectorExpression";

/// Injected on consumers of partitioned data.
pub const INPUT_PARTITIONED: &str = "bindings.input.partitioned";
/// Injected on consumers so instances know how many peers exist.
pub const INSTANCE_COUNT: &str = "instanceCount";

/// Injected on producers: number of partitions downstream.
pub const OUTPUT_PARTITION_COUNT: &str = "bindings.output.partitionCount";
/// Injected on producers: partition key expression.
pub const OUTPUT_PARTITION_KEY_EXPRESSION: &str = "bindings.output.partitionKeyExpression";
/// Injected on producers: partition key extractor class.
pub const OUTPUT_PARTITION_KEY_EXTRACTOR_CLASS: &str =
    "bindings.output.partitionKeyExtractorClass";
/// Injected on producers: partition selector class.
pub const OUTPUT_PARTITION_SELECTOR_CLASS: &str = "bindings.output.partitionSelectorClass";
/// Injected on producers: partition selector expression.
pub const OUTPUT_PARTITION_SELECTOR_EXPRESSION: &str =
    "bindings.output.partitionSelectorExpression";

/// Partition key expression used when a producer declares none.
pub const DEFAULT_PARTITION_KEY_EXPRESSION: &str = "payload";

/// Parameter listing libraries a stage includes.
pub const INCLUDES: &str = "includes";
