//! Resolution of stage artifacts and library references.

use super::ArtifactRegistry;
use crate::core::{ArtifactCoordinates, ArtifactType, StageRole};
use crate::errors::DeployError;

/// Resolves names to coordinates through a registry.
///
/// Nothing is cached: every call reads the registry, so registrations made
/// between planning passes are always observed.
#[derive(Clone, Copy)]
pub struct CoordinateResolver<'a> {
    registry: &'a dyn ArtifactRegistry,
}

impl<'a> CoordinateResolver<'a> {
    /// Creates a resolver over the given registry.
    #[must_use]
    pub fn new(registry: &'a dyn ArtifactRegistry) -> Self {
        Self { registry }
    }

    /// Resolves the artifact for a stage of the given role.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::ModuleNotRegistered`] when nothing is registered
    /// for `(name, role)`.
    pub fn resolve(&self, name: &str, role: StageRole) -> Result<ArtifactCoordinates, DeployError> {
        let artifact_type = role.artifact_type();
        self.registry
            .find(name, artifact_type)
            .map(|registration| registration.coordinates)
            .ok_or_else(|| DeployError::not_registered(name, artifact_type))
    }

    /// Resolves a library token: literal coordinates are used as-is,
    /// anything else is looked up as a registered library.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::UnresolvedLibrary`] when the token neither
    /// parses nor is registered.
    pub fn resolve_library_reference(&self, token: &str) -> Result<ArtifactCoordinates, DeployError> {
        if let Ok(coordinates) = ArtifactCoordinates::parse(token) {
            return Ok(coordinates);
        }

        tracing::debug!(token, "Library token is not literal coordinates, consulting registry");
        self.registry
            .find(token, ArtifactType::Library)
            .map(|registration| registration.coordinates)
            .ok_or_else(|| DeployError::unresolved_library(token))
    }

    /// Resolves a comma-delimited `includes` list into a comma-joined list of
    /// canonical coordinates. Spaces and tabs inside tokens are dropped and
    /// empty tokens are skipped.
    ///
    /// # Errors
    ///
    /// Fails on the first token that cannot be resolved.
    pub fn resolve_includes(&self, includes: &str) -> Result<String, DeployError> {
        let resolved = includes
            .split(',')
            .map(|token| token.chars().filter(|c| *c != ' ' && *c != '\t').collect::<String>())
            .filter(|token| !token.is_empty())
            .map(|token| self.resolve_library_reference(&token).map(|c| c.to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(resolved.join(","))
    }
}
