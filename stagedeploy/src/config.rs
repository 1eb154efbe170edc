//! Coordinator configuration.

use crate::core::binding;
use crate::errors::DeployError;
use crate::planning::DEFAULT_PROPERTY_PREFIX;
use serde::{Deserialize, Serialize};

/// Settings for planning and lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Scope prefix of per-stage overrides (`<prefix>.*.<key>`, `<prefix>.<label>.<key>`).
    #[serde(default = "default_property_prefix")]
    pub property_prefix: String,
    /// Key expression given to partitioned producers that declare none.
    #[serde(default = "default_partition_key_expression")]
    pub default_partition_key_expression: String,
    /// Stage parameter listing included libraries.
    #[serde(default = "default_includes_parameter")]
    pub includes_parameter: String,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_property_prefix() -> String {
    DEFAULT_PROPERTY_PREFIX.to_string()
}

fn default_partition_key_expression() -> String {
    binding::DEFAULT_PARTITION_KEY_EXPRESSION.to_string()
}

fn default_includes_parameter() -> String {
    binding::INCLUDES.to_string()
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            property_prefix: default_property_prefix(),
            default_partition_key_expression: default_partition_key_expression(),
            includes_parameter: default_includes_parameter(),
            logging: LoggingConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::InvalidProperty`] naming the document when it
    /// is not valid JSON for this shape.
    pub fn from_json(json: &str) -> Result<Self, DeployError> {
        serde_json::from_str(json)
            .map_err(|e| DeployError::invalid_property("", "config", e.to_string()))
    }

    /// Sets the override scope prefix.
    #[must_use]
    pub fn with_property_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.property_prefix = prefix.into();
        self
    }

    /// Sets the default partition key expression.
    #[must_use]
    pub fn with_default_partition_key_expression(mut self, expression: impl Into<String>) -> Self {
        self.default_partition_key_expression = expression.into();
        self
    }

    /// Sets the includes parameter name.
    #[must_use]
    pub fn with_includes_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.includes_parameter = parameter.into();
        self
    }

    /// Sets the logging configuration.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}

/// Logging settings used by [`crate::observability::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Sets the level directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Enables JSON output.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }
}
