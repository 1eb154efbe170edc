//! In-memory artifact registry.

use super::{ArtifactRegistration, ArtifactRegistry};
use crate::core::{ArtifactCoordinates, ArtifactType};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Registry backed by a map guarded by a read-write lock.
#[derive(Debug, Default)]
pub struct InMemoryArtifactRegistry {
    entries: RwLock<HashMap<(String, ArtifactType), ArtifactRegistration>>,
}

impl InMemoryArtifactRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the coordinates for a `(name, type)` pair.
    ///
    /// Returns the registration that was replaced, if any.
    pub fn register(
        &self,
        name: impl Into<String>,
        artifact_type: ArtifactType,
        coordinates: ArtifactCoordinates,
    ) -> Option<ArtifactRegistration> {
        let registration = ArtifactRegistration::new(name, artifact_type, coordinates);
        let key = (registration.name.clone(), artifact_type);
        self.entries.write().insert(key, registration)
    }

    /// Removes a registration.
    pub fn unregister(
        &self,
        name: &str,
        artifact_type: ArtifactType,
    ) -> Option<ArtifactRegistration> {
        self.entries
            .write()
            .remove(&(name.to_string(), artifact_type))
    }

    /// Returns all registrations, optionally filtered by type, sorted by name.
    #[must_use]
    pub fn list(&self, artifact_type: Option<ArtifactType>) -> Vec<ArtifactRegistration> {
        let entries = self.entries.read();
        let mut result: Vec<_> = entries
            .values()
            .filter(|r| artifact_type.map_or(true, |t| r.artifact_type == t))
            .cloned()
            .collect();
        result.sort_by(|a, b| (&a.name, a.artifact_type).cmp(&(&b.name, b.artifact_type)));
        result
    }

    /// Remove all registered entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Returns the number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ArtifactRegistry for InMemoryArtifactRegistry {
    fn find(&self, name: &str, artifact_type: ArtifactType) -> Option<ArtifactRegistration> {
        self.entries
            .read()
            .get(&(name.to_string(), artifact_type))
            .cloned()
    }
}
