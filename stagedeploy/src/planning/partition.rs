//! Partition propagation across adjacent stages.
//!
//! Stages are visited in deployment order, so a consumer's partitioning
//! decision is known by the time its producer (the next stage visited) is
//! processed. Propagation is single-hop: only the immediate data-flow
//! neighbours influence each other.

use crate::core::{binding, DeploymentProperties, StageDefinition};
use crate::errors::DeployError;

/// Accumulator threaded through the deployment-order walk.
///
/// Describes the stage visited in the previous step, which is the data-flow
/// downstream neighbour of the stage about to be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionState {
    /// Resolved instance count of the downstream neighbour.
    pub next_instance_count: u32,
    /// Whether the downstream neighbour consumes partitioned data.
    pub downstream_partitioned: bool,
}

impl Default for PartitionState {
    fn default() -> Self {
        Self {
            next_instance_count: 1,
            downstream_partitioned: false,
        }
    }
}

impl PartitionState {
    /// Applies one propagation step to `properties` of `stage` and returns
    /// the state for the next (data-flow upstream) stage.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::InvalidProperty`] if the stage's `count` is not
    /// a positive integer.
    pub fn step(
        self,
        stage: &StageDefinition,
        properties: &mut DeploymentProperties,
        upstream_has_partition_info: bool,
        default_key_expression: &str,
    ) -> Result<Self, DeployError> {
        let partitioned_consumer =
            is_partitioned_consumer(stage, properties, upstream_has_partition_info);

        if partitioned_consumer {
            apply_consumer_properties(properties);
        }
        if self.downstream_partitioned {
            apply_producer_properties(properties, self.next_instance_count, default_key_expression);
        }

        Ok(Self {
            next_instance_count: instance_count(stage, properties)?,
            downstream_partitioned: partitioned_consumer,
        })
    }
}

/// Returns true if a stage's merged properties declare how to partition its output.
#[must_use]
pub fn has_partition_info(properties: &DeploymentProperties) -> bool {
    properties.contains_key(binding::PARTITION_KEY_EXPRESSION)
        || properties.contains_key(binding::PARTITION_KEY_EXTRACTOR_CLASS)
}

/// Returns true if the stage consumes partitioned data, either because its
/// upstream neighbour partitions its output or because the stage has an
/// input binding and is flagged `partitioned=true`.
#[must_use]
pub fn is_partitioned_consumer(
    stage: &StageDefinition,
    properties: &DeploymentProperties,
    upstream_has_partition_info: bool,
) -> bool {
    upstream_has_partition_info
        || (stage.has_input_binding()
            && properties
                .get(binding::PARTITIONED)
                .is_some_and(|v| v.eq_ignore_ascii_case("true")))
}

/// Marks the input as partitioned and publishes the instance count.
pub fn apply_consumer_properties(properties: &mut DeploymentProperties) {
    properties.insert(binding::INPUT_PARTITIONED.to_string(), "true".to_string());
    if let Some(count) = properties.get(binding::COUNT).cloned() {
        properties.insert(binding::INSTANCE_COUNT.to_string(), count);
    }
}

/// Configures the output to partition across `partition_count` consumers.
pub fn apply_producer_properties(
    properties: &mut DeploymentProperties,
    partition_count: u32,
    default_key_expression: &str,
) {
    properties.insert(
        binding::OUTPUT_PARTITION_COUNT.to_string(),
        partition_count.to_string(),
    );

    let key_expression = properties
        .get(binding::PARTITION_KEY_EXPRESSION)
        .cloned()
        .unwrap_or_else(|| default_key_expression.to_string());
    properties.insert(
        binding::OUTPUT_PARTITION_KEY_EXPRESSION.to_string(),
        key_expression,
    );

    for (source, target) in [
        (
            binding::PARTITION_KEY_EXTRACTOR_CLASS,
            binding::OUTPUT_PARTITION_KEY_EXTRACTOR_CLASS,
        ),
        (
            binding::PARTITION_SELECTOR_CLASS,
            binding::OUTPUT_PARTITION_SELECTOR_CLASS,
        ),
        (
            binding::PARTITION_SELECTOR_EXPRESSION,
            binding::OUTPUT_PARTITION_SELECTOR_EXPRESSION,
        ),
    ] {
        if let Some(value) = properties.get(source).cloned() {
            properties.insert(target.to_string(), value);
        }
    }
}

/// Resolved instance count of a stage: its `count` property, default 1.
///
/// # Errors
///
/// Returns [`DeployError::InvalidProperty`] if `count` is not a positive integer.
pub fn instance_count(
    stage: &StageDefinition,
    properties: &DeploymentProperties,
) -> Result<u32, DeployError> {
    let Some(raw) = properties.get(binding::COUNT) else {
        return Ok(1);
    };

    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| DeployError::invalid_property(stage.label(), binding::COUNT, raw))
}

/// Injects partitioning properties across a whole pipeline.
#[derive(Debug, Clone)]
pub struct PartitionPropagator {
    default_key_expression: String,
}

impl Default for PartitionPropagator {
    fn default() -> Self {
        Self::new(binding::DEFAULT_PARTITION_KEY_EXPRESSION)
    }
}

impl PartitionPropagator {
    /// Creates a propagator using the given default key expression.
    #[must_use]
    pub fn new(default_key_expression: impl Into<String>) -> Self {
        Self {
            default_key_expression: default_key_expression.into(),
        }
    }

    /// Returns the key expression applied to producers that declare none.
    #[must_use]
    pub fn default_key_expression(&self) -> &str {
        &self.default_key_expression
    }

    /// Rewrites `properties` in place.
    ///
    /// `stages` and `properties` are parallel slices in deployment order; the
    /// data-flow upstream neighbour of index `i` is index `i + 1`. Partition
    /// info is read from the properties as merged, before any injection.
    ///
    /// # Errors
    ///
    /// Fails on the first stage with an invalid `count`.
    pub fn propagate(
        &self,
        stages: &[&StageDefinition],
        properties: &mut [DeploymentProperties],
    ) -> Result<(), DeployError> {
        debug_assert_eq!(stages.len(), properties.len());

        let partition_info: Vec<bool> = properties.iter().map(has_partition_info).collect();

        stages
            .iter()
            .zip(properties.iter_mut())
            .enumerate()
            .try_fold(PartitionState::default(), |state, (i, (stage, props))| {
                let upstream = partition_info.get(i + 1).copied().unwrap_or(false);
                state.step(stage, props, upstream, &self.default_key_expression)
            })
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn props(pairs: &[(&str, &str)]) -> DeploymentProperties {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    fn sink() -> StageDefinition {
        StageDefinition::builder("log").input_binding("p.1").build()
    }

    fn processor() -> StageDefinition {
        StageDefinition::builder("transform").input_binding("p.0").output_binding("p.1").build()
    }

    fn source() -> StageDefinition {
        StageDefinition::builder("http").output_binding("p.0").build()
    }

    #[test]
    fn test_flagged_consumer_step() {
        let mut p = props(&[("partitioned", "TRUE"), ("count", "4")]);

        let next = PartitionState::default()
            .step(&processor(), &mut p, false, "payload")
            .unwrap();

        assert_eq!(p.get(binding::INPUT_PARTITIONED).unwrap(), "true");
        assert_eq!(p.get(binding::INSTANCE_COUNT).unwrap(), "4");
        assert!(!p.contains_key(binding::OUTPUT_PARTITION_COUNT));
        assert_eq!(
            next,
            PartitionState {
                next_instance_count: 4,
                downstream_partitioned: true
            }
        );
    }

    #[test]
    fn test_partitioned_flag_needs_input_binding() {
        let p = props(&[("partitioned", "true")]);
        assert!(!is_partitioned_consumer(&source(), &p, false));
        assert!(is_partitioned_consumer(&processor(), &p, false));
        assert!(!is_partitioned_consumer(&processor(), &props(&[("partitioned", "no")]), false));
    }

    #[test]
    fn test_upstream_partition_info_makes_consumer() {
        let mut p = DeploymentProperties::new();
        let next = PartitionState::default().step(&sink(), &mut p, true, "payload").unwrap();

        assert_eq!(p, props(&[(binding::INPUT_PARTITIONED, "true")]));
        assert!(next.downstream_partitioned);
        assert_eq!(next.next_instance_count, 1);
    }

    #[test]
    fn test_producer_step_defaults_key_expression() {
        let state = PartitionState {
            next_instance_count: 3,
            downstream_partitioned: true,
        };
        let mut p = DeploymentProperties::new();

        let next = state.step(&source(), &mut p, false, "payload").unwrap();

        assert_eq!(
            p,
            props(&[
                (binding::OUTPUT_PARTITION_COUNT, "3"),
                (binding::OUTPUT_PARTITION_KEY_EXPRESSION, "payload"),
            ])
        );
        assert_eq!(next, PartitionState::default());
    }

    #[test]
    fn test_producer_copies_declared_partitioning() {
        let mut p = props(&[
            (binding::PARTITION_KEY_EXPRESSION, "headers.id"),
            (binding::PARTITION_KEY_EXTRACTOR_CLASS, "com.acme.Extractor"),
            (binding::PARTITION_SELECTOR_CLASS, "com.acme.Selector"),
            (binding::PARTITION_SELECTOR_EXPRESSION, "hashCode()"),
        ]);

        apply_producer_properties(&mut p, 2, "payload");

        assert_eq!(p.get(binding::OUTPUT_PARTITION_COUNT).unwrap(), "2");
        assert_eq!(p.get(binding::OUTPUT_PARTITION_KEY_EXPRESSION).unwrap(), "headers.id");
        assert_eq!(
            p.get(binding::OUTPUT_PARTITION_KEY_EXTRACTOR_CLASS).unwrap(),
            "com.acme.Extractor"
        );
        assert_eq!(p.get(binding::OUTPUT_PARTITION_SELECTOR_CLASS).unwrap(), "com.acme.Selector");
        assert_eq!(
            p.get(binding::OUTPUT_PARTITION_SELECTOR_EXPRESSION).unwrap(),
            "hashCode()"
        );
    }

    #[test]
    fn test_instance_count() {
        let stage = sink();
        assert_eq!(instance_count(&stage, &DeploymentProperties::new()).unwrap(), 1);
        assert_eq!(instance_count(&stage, &props(&[("count", "5")])).unwrap(), 5);
        assert!(instance_count(&stage, &props(&[("count", "0")])).is_err());
        assert!(instance_count(&stage, &props(&[("count", "lots")])).is_err());
    }

    #[test]
    fn test_propagate_three_stages() {
        let (log, transform, http) = (sink(), processor(), source());
        let stages = vec![&log, &transform, &http];
        let mut properties = vec![
            DeploymentProperties::new(),
            props(&[("partitioned", "true"), ("count", "4")]),
            DeploymentProperties::new(),
        ];

        PartitionPropagator::default().propagate(&stages, &mut properties).unwrap();

        assert!(properties[0].is_empty());
        assert_eq!(properties[1].get(binding::INSTANCE_COUNT).unwrap(), "4");
        assert_eq!(properties[1].get(binding::INPUT_PARTITIONED).unwrap(), "true");
        assert_eq!(properties[2].get(binding::OUTPUT_PARTITION_COUNT).unwrap(), "4");
        assert_eq!(
            properties[2].get(binding::OUTPUT_PARTITION_KEY_EXPRESSION).unwrap(),
            "payload"
        );
    }

    #[test]
    fn test_propagate_from_upstream_key_expression() {
        // source declares a key expression; the processor becomes a partitioned
        // consumer and the source a producer for the processor's instances.
        let (log, transform, http) = (sink(), processor(), source());
        let stages = vec![&log, &transform, &http];
        let mut properties = vec![
            DeploymentProperties::new(),
            props(&[("count", "2")]),
            props(&[(binding::PARTITION_KEY_EXPRESSION, "payload.id")]),
        ];

        PartitionPropagator::new("payload").propagate(&stages, &mut properties).unwrap();

        assert!(!properties[0].contains_key(binding::INPUT_PARTITIONED));
        assert_eq!(properties[1].get(binding::INPUT_PARTITIONED).unwrap(), "true");
        assert_eq!(properties[1].get(binding::INSTANCE_COUNT).unwrap(), "2");
        assert!(!properties[1].contains_key(binding::OUTPUT_PARTITION_COUNT));
        assert_eq!(properties[2].get(binding::OUTPUT_PARTITION_COUNT).unwrap(), "2");
        assert_eq!(
            properties[2].get(binding::OUTPUT_PARTITION_KEY_EXPRESSION).unwrap(),
            "payload.id"
        );
    }

    #[test]
    fn test_propagation_is_single_hop() {
        // Only the sink is partitioned; the source two hops away is untouched.
        let (log, transform, http) = (sink(), processor(), source());
        let stages = vec![&log, &transform, &http];
        let mut properties = vec![
            props(&[("partitioned", "true"), ("count", "3")]),
            DeploymentProperties::new(),
            DeploymentProperties::new(),
        ];

        PartitionPropagator::default().propagate(&stages, &mut properties).unwrap();

        assert_eq!(properties[1].get(binding::OUTPUT_PARTITION_COUNT).unwrap(), "3");
        assert!(properties[2].is_empty());
    }
}
