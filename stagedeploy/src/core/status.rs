//! Stage roles, artifact types and deployment states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role a stage plays in the data flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRole {
    /// Produces data; has only an output binding.
    Source,
    /// Transforms data; has both an input and an output binding.
    Processor,
    /// Consumes data; has only an input binding.
    Sink,
}

impl StageRole {
    /// The registry artifact type stages of this role are registered under.
    #[must_use]
    pub fn artifact_type(self) -> ArtifactType {
        match self {
            Self::Source => ArtifactType::Source,
            Self::Processor => ArtifactType::Processor,
            Self::Sink => ArtifactType::Sink,
        }
    }

    /// Returns true if stages of this role consume from an input binding.
    #[must_use]
    pub fn consumes(self) -> bool {
        matches!(self, Self::Processor | Self::Sink)
    }

    /// Returns true if stages of this role publish to an output binding.
    #[must_use]
    pub fn produces(self) -> bool {
        matches!(self, Self::Source | Self::Processor)
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.artifact_type(), f)
    }
}

/// The kind of artifact held by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    /// A source module.
    Source,
    /// A processor module.
    Processor,
    /// A sink module.
    Sink,
    /// A library that modules may include.
    Library,
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Processor => write!(f, "processor"),
            Self::Sink => write!(f, "sink"),
            Self::Library => write!(f, "library"),
        }
    }
}

/// Runtime state of a single deployed stage, as reported by the deployer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    /// The deployer has no record of the stage.
    Unknown,
    /// Deployment is in progress.
    Deploying,
    /// The stage is running.
    Deployed,
    /// Deployment failed.
    Failed,
    /// The deployer hit an error while managing the stage.
    Error,
    /// The stage was removed.
    Undeployed,
}

impl DeploymentState {
    /// Returns true if the stage is not running and needs no undeploy call.
    #[must_use]
    pub fn is_inactive(self) -> bool {
        matches!(self, Self::Unknown | Self::Undeployed)
    }
}

impl Default for DeploymentState {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Deploying => write!(f, "deploying"),
            Self::Deployed => write!(f, "deployed"),
            Self::Failed => write!(f, "failed"),
            Self::Error => write!(f, "error"),
            Self::Undeployed => write!(f, "undeployed"),
        }
    }
}

/// State of a whole pipeline, derived from its stage states on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregatedState {
    /// See [`DeploymentState::Unknown`].
    Unknown,
    /// At least one stage is still deploying.
    Deploying,
    /// Every stage is deployed.
    Deployed,
    /// At least one stage failed.
    Failed,
    /// At least one stage is in error, or no stage state was available.
    Error,
    /// Every stage is undeployed or unknown to the deployer.
    Undeployed,
    /// A mix of states with nothing actively wrong.
    Partial,
}

impl From<DeploymentState> for AggregatedState {
    fn from(state: DeploymentState) -> Self {
        match state {
            DeploymentState::Unknown => Self::Unknown,
            DeploymentState::Deploying => Self::Deploying,
            DeploymentState::Deployed => Self::Deployed,
            DeploymentState::Failed => Self::Failed,
            DeploymentState::Error => Self::Error,
            DeploymentState::Undeployed => Self::Undeployed,
        }
    }
}

impl AggregatedState {
    /// Returns the lowercase name reported to callers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Deploying => "deploying",
            Self::Deployed => "deployed",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Undeployed => "undeployed",
            Self::Partial => "partial",
        }
    }
}

impl fmt::Display for AggregatedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_artifact_type() {
        assert_eq!(StageRole::Source.artifact_type(), ArtifactType::Source);
        assert_eq!(StageRole::Processor.artifact_type(), ArtifactType::Processor);
        assert_eq!(StageRole::Sink.artifact_type(), ArtifactType::Sink);
    }

    #[test]
    fn test_role_bindings() {
        assert!(StageRole::Source.produces());
        assert!(!StageRole::Source.consumes());
        assert!(StageRole::Processor.produces());
        assert!(StageRole::Processor.consumes());
        assert!(StageRole::Sink.consumes());
        assert!(!StageRole::Sink.produces());
    }

    #[test]
    fn test_deployment_state_inactive() {
        assert!(DeploymentState::Unknown.is_inactive());
        assert!(DeploymentState::Undeployed.is_inactive());
        assert!(!DeploymentState::Deployed.is_inactive());
        assert!(!DeploymentState::Failed.is_inactive());
        assert!(!DeploymentState::Deploying.is_inactive());
    }

    #[test]
    fn test_aggregated_state_display() {
        assert_eq!(AggregatedState::Partial.to_string(), "partial");
        assert_eq!(AggregatedState::Undeployed.as_str(), "undeployed");
        assert_eq!(
            serde_json::to_value(AggregatedState::Partial).unwrap(),
            AggregatedState::Partial.as_str()
        );
        assert_eq!(AggregatedState::from(DeploymentState::Deploying).to_string(), "deploying");
    }

    #[test]
    fn test_deployment_state_serialize() {
        let json = serde_json::to_string(&DeploymentState::Undeployed).unwrap();
        assert_eq!(json, r#""undeployed""#);

        let state: DeploymentState = serde_json::from_str(r#""failed""#).unwrap();
        assert_eq!(state, DeploymentState::Failed);
    }

    #[test]
    fn test_artifact_type_serialize() {
        let json = serde_json::to_string(&ArtifactType::Library).unwrap();
        assert_eq!(json, r#""library""#);
    }
}
