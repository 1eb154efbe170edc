//! Maven-style artifact coordinates.

use crate::errors::DeployError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Extension used when coordinates do not name one.
pub const DEFAULT_EXTENSION: &str = "jar";

static COORDINATES_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^: ]+):([^: ]+)(:([^: ]*)(:([^: ]+))?)?:([^: ]+)$")
        .expect("valid coordinates regex")
});

/// Locator for a runnable artifact:
/// `group:artifact[:extension[:classifier]]:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactCoordinates {
    /// Group identifier.
    pub group_id: String,
    /// Artifact identifier.
    pub artifact_id: String,
    /// Packaging extension, `jar` unless stated.
    pub extension: String,
    /// Optional classifier, empty when absent.
    #[serde(default)]
    pub classifier: String,
    /// Artifact version.
    pub version: String,
}

impl ArtifactCoordinates {
    /// Creates coordinates with the default extension and no classifier.
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            classifier: String::new(),
            version: version.into(),
        }
    }

    /// Sets the extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = classifier.into();
        self
    }

    /// Parses a coordinate string.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::InvalidCoordinates`] when the string does not
    /// have at least `group:artifact:version`.
    pub fn parse(coordinates: &str) -> Result<Self, DeployError> {
        let captures = COORDINATES_PATTERN
            .captures(coordinates)
            .ok_or_else(|| DeployError::InvalidCoordinates(coordinates.to_string()))?;

        let group = |i: usize| captures.get(i).map_or("", |m| m.as_str());
        let extension = match group(4) {
            "" => DEFAULT_EXTENSION,
            ext => ext,
        };

        Ok(Self {
            group_id: group(1).to_string(),
            artifact_id: group(2).to_string(),
            extension: extension.to_string(),
            classifier: group(6).to_string(),
            version: group(7).to_string(),
        })
    }
}

impl FromStr for ArtifactCoordinates {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ArtifactCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}
