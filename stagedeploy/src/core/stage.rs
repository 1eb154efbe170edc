//! Stage definitions.

use super::binding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered string parameters of a stage.
pub type StageParameters = BTreeMap<String, String>;

/// One stage of a pipeline, as produced by the pipeline parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Artifact name used for registry lookup.
    name: String,
    /// Pipeline-unique alias, defaults to `name`.
    label: String,
    /// Name of the pipeline this stage belongs to; set when the pipeline is built.
    #[serde(default)]
    group: String,
    /// User configuration plus binding markers.
    #[serde(default)]
    parameters: StageParameters,
}

impl StageDefinition {
    /// Starts building a stage with the given artifact name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> StageDefinitionBuilder {
        StageDefinitionBuilder::new(name)
    }

    /// Returns the artifact name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the owning pipeline name.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns all parameters.
    #[must_use]
    pub fn parameters(&self) -> &StageParameters {
        &self.parameters
    }

    /// Returns a single parameter.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Returns true if the parser attached an input binding marker.
    #[must_use]
    pub fn has_input_binding(&self) -> bool {
        self.parameters.contains_key(binding::INPUT_BINDING)
    }

    /// Returns true if the parser attached an output binding marker.
    #[must_use]
    pub fn has_output_binding(&self) -> bool {
        self.parameters.contains_key(binding::OUTPUT_BINDING)
    }

    /// Returns a copy with one parameter replaced.
    #[must_use]
    pub fn with_parameter(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.parameters.insert(key.into(), value.into());
        copy
    }

    pub(crate) fn in_group(mut self, group: &str) -> Self {
        self.group = group.to_string();
        self
    }
}

impl fmt::Display for StageDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label == self.name {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.label, self.name)
        }
    }
}

/// Builder for [`StageDefinition`].
#[derive(Debug, Clone)]
pub struct StageDefinitionBuilder {
    name: String,
    label: Option<String>,
    parameters: StageParameters,
}

impl StageDefinitionBuilder {
    /// Creates a builder for the given artifact name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            parameters: StageParameters::new(),
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adds a parameter.
    #[must_use]
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Marks the stage as consuming from the given destination.
    #[must_use]
    pub fn input_binding(self, destination: impl Into<String>) -> Self {
        self.parameter(binding::INPUT_BINDING, destination)
    }

    /// Marks the stage as publishing to the given destination.
    #[must_use]
    pub fn output_binding(self, destination: impl Into<String>) -> Self {
        self.parameter(binding::OUTPUT_BINDING, destination)
    }

    /// Builds the stage.
    #[must_use]
    pub fn build(self) -> StageDefinition {
        StageDefinition {
            label: self.label.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            group: String::new(),
            parameters: self.parameters,
        }
    }
}
