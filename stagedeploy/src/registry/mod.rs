//! Artifact registry and coordinate resolution.
//!
//! This module provides:
//! - The registry lookup seam, keyed by `(name, type)`
//! - An in-memory registry
//! - Resolution of stage artifacts and included libraries

mod memory;
mod resolver;

pub use memory::InMemoryArtifactRegistry;
pub use resolver::CoordinateResolver;

use crate::core::{ArtifactCoordinates, ArtifactType};
use serde::{Deserialize, Serialize};

/// A registered artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRegistration {
    /// The name stages refer to the artifact by.
    pub name: String,
    /// The artifact type.
    pub artifact_type: ArtifactType,
    /// Where the artifact lives.
    pub coordinates: ArtifactCoordinates,
}

impl ArtifactRegistration {
    /// Creates a registration.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        artifact_type: ArtifactType,
        coordinates: ArtifactCoordinates,
    ) -> Self {
        Self {
            name: name.into(),
            artifact_type,
            coordinates,
        }
    }
}

/// Read access to registered artifacts.
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactRegistry: Send + Sync {
    /// Looks up the registration for a `(name, type)` pair.
    fn find(&self, name: &str, artifact_type: ArtifactType) -> Option<ArtifactRegistration>;
}
