//! Deployment property overrides.
//!
//! Pipeline-wide overrides address stages by scope: `stage.*.<key>` applies
//! to every stage, `stage.<label>.<key>` only to the stage with that label.
//! Label scope always wins, regardless of declaration order.

use crate::core::{DeploymentProperties, StageDefinition};
use crate::errors::DeployError;

/// Default scope prefix for per-stage overrides.
pub const DEFAULT_PROPERTY_PREFIX: &str = "stage";

/// Wildcard scope matching every stage.
pub const WILDCARD_SCOPE: &str = "*";

/// Merges the overrides that apply to `stage` using the default prefix.
#[must_use]
pub fn merge_properties(
    stage: &StageDefinition,
    pipeline_properties: &DeploymentProperties,
) -> DeploymentProperties {
    merge_properties_with_prefix(stage, pipeline_properties, DEFAULT_PROPERTY_PREFIX)
}

/// Merges the overrides that apply to `stage`, stripping the scope prefix.
#[must_use]
pub fn merge_properties_with_prefix(
    stage: &StageDefinition,
    pipeline_properties: &DeploymentProperties,
    prefix: &str,
) -> DeploymentProperties {
    let wildcard = format!("{prefix}.{WILDCARD_SCOPE}.");
    let scoped = format!("{prefix}.{}.", stage.label());

    let mut merged = DeploymentProperties::new();
    for scope in [&wildcard, &scoped] {
        for (key, value) in pipeline_properties {
            if let Some(stripped) = key.strip_prefix(scope.as_str()) {
                merged.insert(stripped.to_string(), value.clone());
            }
        }
    }
    merged
}

/// Parses a comma-delimited `key=value` list into override properties.
///
/// Keys and values are trimmed and split on the first `=`. A segment with no
/// `=` continues the previous value, so values may contain commas.
///
/// # Errors
///
/// Returns [`DeployError::InvalidProperty`] when the first segment has no `=`
/// or a key is empty.
pub fn parse_deployment_properties(input: &str) -> Result<DeploymentProperties, DeployError> {
    let mut properties = DeploymentProperties::new();
    if input.trim().is_empty() {
        return Ok(properties);
    }

    let mut pairs: Vec<String> = Vec::new();
    for segment in input.split(',') {
        match pairs.last_mut() {
            Some(pair) if !segment.contains('=') => {
                pair.push(',');
                pair.push_str(segment);
            }
            None if !segment.contains('=') => {
                return Err(DeployError::invalid_property("", segment.trim(), ""));
            }
            _ => pairs.push(segment.to_string()),
        }
    }

    for pair in &pairs {
        let pair = pair.trim();
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = key.trim();
        if key.is_empty() {
            return Err(DeployError::invalid_property("", key, pair));
        }
        properties.insert(key.to_string(), value.trim().to_string());
    }

    Ok(properties)
}
