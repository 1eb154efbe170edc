//! Error types for stagedeploy.
//!
//! Planning errors are fatal for the whole planning pass: nothing is handed
//! to the deployer once any of them is raised. Deployer errors surface
//! whatever the external deployer reported.

use crate::core::ArtifactType;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// The main error type for stagedeploy operations.
#[derive(Debug, Error)]
pub enum DeployError {
    /// No registration exists for a `(name, type)` pair.
    #[error("Module {name} of type {artifact_type} not found in registry")]
    ModuleNotRegistered {
        /// The artifact name that was looked up.
        name: String,
        /// The artifact type that was looked up.
        artifact_type: ArtifactType,
    },

    /// A library token is neither literal coordinates nor a registered library.
    #[error("'{token}' could not be parsed as artifact coordinates and is not a registered library")]
    UnresolvedLibrary {
        /// The offending token.
        token: String,
    },

    /// A stage declares neither an input nor an output binding.
    #[error("Stage '{stage}' had neither input nor output binding set")]
    AmbiguousRole {
        /// Label of the stage.
        stage: String,
    },

    /// A coordinate string could not be parsed.
    #[error("Invalid artifact coordinates: {0}")]
    InvalidCoordinates(String),

    /// A deployment property carries a value that cannot be used.
    #[error("Invalid value '{value}' for property '{key}' of stage '{stage}'")]
    InvalidProperty {
        /// Label of the stage, or empty when the property is pipeline wide.
        stage: String,
        /// The property key.
        key: String,
        /// The rejected value.
        value: String,
    },

    /// The pipeline definition itself is malformed.
    #[error("{0}")]
    InvalidPipeline(#[from] PipelineValidationError),

    /// The external deployer reported a failure.
    #[error("{0}")]
    Deployer(#[from] DeployerError),
}

impl DeployError {
    /// Creates a module-not-registered error.
    #[must_use]
    pub fn not_registered(name: impl Into<String>, artifact_type: ArtifactType) -> Self {
        Self::ModuleNotRegistered {
            name: name.into(),
            artifact_type,
        }
    }

    /// Creates an unresolved library error.
    #[must_use]
    pub fn unresolved_library(token: impl Into<String>) -> Self {
        Self::UnresolvedLibrary {
            token: token.into(),
        }
    }

    /// Creates an invalid property error.
    #[must_use]
    pub fn invalid_property(
        stage: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidProperty {
            stage: stage.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Stable error code for API layers.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ModuleNotRegistered { .. } => codes::NOT_REGISTERED,
            Self::UnresolvedLibrary { .. } => codes::UNRESOLVED_LIBRARY,
            Self::AmbiguousRole { .. } => codes::AMBIGUOUS_ROLE,
            Self::InvalidCoordinates(_) => codes::INVALID_COORDINATES,
            Self::InvalidProperty { .. } => codes::INVALID_PROPERTY,
            Self::InvalidPipeline(_) => codes::INVALID_PIPELINE,
            Self::Deployer(_) => codes::DEPLOYER,
        }
    }

    /// Returns true when the error was raised before anything reached the deployer.
    #[must_use]
    pub fn is_planning_error(&self) -> bool {
        !matches!(self, Self::Deployer(_))
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("code".to_string(), json!(self.code()));
        map.insert("message".to_string(), json!(self.to_string()));

        match self {
            Self::ModuleNotRegistered { name, artifact_type } => {
                map.insert("name".to_string(), json!(name));
                map.insert("artifact_type".to_string(), json!(artifact_type));
            }
            Self::UnresolvedLibrary { token } => {
                map.insert("token".to_string(), json!(token));
            }
            Self::AmbiguousRole { stage } => {
                map.insert("stage".to_string(), json!(stage));
            }
            Self::InvalidProperty { stage, key, value } => {
                map.insert("stage".to_string(), json!(stage));
                map.insert("key".to_string(), json!(key));
                map.insert("value".to_string(), json!(value));
            }
            Self::InvalidPipeline(err) => {
                map.insert("stages".to_string(), json!(err.stages));
            }
            Self::InvalidCoordinates(_) | Self::Deployer(_) => {}
        }

        map
    }
}

/// Error raised when a pipeline definition fails validation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// Labels of the stages involved in the error.
    pub stages: Vec<String>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }
}

/// Failures reported by an external deployer.
#[derive(Debug, Clone, Error)]
pub enum DeployerError {
    /// The deployer could not be reached.
    #[error("Deployer unavailable: {reason}")]
    Unavailable {
        /// The reason given.
        reason: String,
    },

    /// The deployer refused the request.
    #[error("Deployer rejected '{id}': {reason}")]
    Rejected {
        /// Deployment identity of the affected stage.
        id: String,
        /// The reason given.
        reason: String,
    },
}

impl DeployerError {
    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a rejected error.
    #[must_use]
    pub fn rejected(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Stable error codes.
pub mod codes {
    /// Artifact lookup miss.
    pub const NOT_REGISTERED: &str = "DEPLOY-001-NOT_REGISTERED";
    /// Library token could not be resolved.
    pub const UNRESOLVED_LIBRARY: &str = "DEPLOY-002-UNRESOLVED_LIBRARY";
    /// Stage has no binding markers.
    pub const AMBIGUOUS_ROLE: &str = "DEPLOY-003-AMBIGUOUS_ROLE";
    /// Malformed coordinates.
    pub const INVALID_COORDINATES: &str = "DEPLOY-004-COORDINATES";
    /// Malformed property value.
    pub const INVALID_PROPERTY: &str = "DEPLOY-005-PROPERTY";
    /// Malformed pipeline definition.
    pub const INVALID_PIPELINE: &str = "DEPLOY-006-PIPELINE";
    /// Deployer failure.
    pub const DEPLOYER: &str = "DEPLOY-100-DEPLOYER";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_registered_message() {
        let err = DeployError::not_registered("log", ArtifactType::Sink);
        assert_eq!(err.to_string(), "Module log of type sink not found in registry");
        assert_eq!(err.code(), codes::NOT_REGISTERED);
        assert!(err.is_planning_error());
    }

    #[test]
    fn test_unresolved_library_to_dict() {
        let err = DeployError::unresolved_library("mylib");
        let dict = err.to_dict();

        assert_eq!(dict.get("code").unwrap(), codes::UNRESOLVED_LIBRARY);
        assert_eq!(dict.get("token").unwrap(), "mylib");
    }

    #[test]
    fn test_invalid_property_to_dict() {
        let err = DeployError::invalid_property("transform", "count", "many");
        let dict = err.to_dict();

        assert_eq!(dict.get("stage").unwrap(), "transform");
        assert_eq!(dict.get("key").unwrap(), "count");
        assert_eq!(dict.get("value").unwrap(), "many");
    }

    #[test]
    fn test_pipeline_validation_error() {
        let err: DeployError = PipelineValidationError::new("Duplicate label 'log'")
            .with_stages(vec!["log".to_string()])
            .into();

        assert_eq!(err.code(), codes::INVALID_PIPELINE);
        assert_eq!(err.to_string(), "Duplicate label 'log'");
    }

    #[test]
    fn test_deployer_error_is_not_planning_error() {
        let err: DeployError = DeployerError::unavailable("connection refused").into();
        assert!(!err.is_planning_error());
        assert_eq!(err.to_string(), "Deployer unavailable: connection refused");
    }
}
