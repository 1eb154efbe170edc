//! Pipeline and registry fixtures.

use std::sync::Arc;

use crate::core::{
    ArtifactCoordinates, ArtifactType, PipelineDefinition, StageDefinition, StageRole,
};
use crate::planning::classify;
use crate::registry::InMemoryArtifactRegistry;

/// Group id used for fixture coordinates.
pub const FIXTURE_GROUP: &str = "org.example.stages";
/// Version used for fixture coordinates.
pub const FIXTURE_VERSION: &str = "1.0.0";

/// Coordinates a fixture registry assigns to `name` of the given type.
#[must_use]
pub fn fixture_coordinates(name: &str, artifact_type: ArtifactType) -> ArtifactCoordinates {
    ArtifactCoordinates::new(FIXTURE_GROUP, format!("{name}-{artifact_type}"), FIXTURE_VERSION)
}

/// Builds a linear pipeline: the first name is the source, the last the
/// sink, anything in between a processor. Destinations are `<pipeline>.<n>`.
///
/// Entries may be written `label: name` to give a stage an explicit label.
///
/// # Panics
///
/// Panics if fewer than two names are given, since a lone stage would carry
/// no binding markers.
#[must_use]
pub fn linear_stages(pipeline: &str, names: &[&str]) -> Vec<StageDefinition> {
    assert!(
        names.len() >= 2,
        "a linear pipeline needs at least a source and a sink, got {} stage(s)",
        names.len()
    );
    let last = names.len().saturating_sub(1);
    names
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let (label, name) = match entry.split_once(':') {
                Some((label, name)) => (Some(label.trim()), name.trim()),
                None => (None, entry.trim()),
            };
            let mut builder = StageDefinition::builder(name);
            if let Some(label) = label {
                builder = builder.label(label);
            }
            if i > 0 {
                builder = builder.input_binding(format!("{pipeline}.{}", i - 1));
            }
            if i < last {
                builder = builder.output_binding(format!("{pipeline}.{i}"));
            }
            builder.build()
        })
        .collect()
}

/// A pipeline together with a registry that knows all of its stages.
#[derive(Debug)]
pub struct PipelineFixture {
    /// The pipeline.
    pub pipeline: PipelineDefinition,
    /// Registry preloaded with every stage of the pipeline.
    pub registry: Arc<InMemoryArtifactRegistry>,
}

impl PipelineFixture {
    /// Builds a linear pipeline and registers each stage under its role.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two names are given or the names do not form a
    /// valid pipeline.
    #[must_use]
    pub fn linear(pipeline: &str, names: &[&str]) -> Self {
        let stages = linear_stages(pipeline, names);
        let definition = PipelineDefinition::new(pipeline, names.join(" | "), stages)
            .expect("fixture pipeline is valid");

        let registry = Arc::new(InMemoryArtifactRegistry::new());
        for stage in definition.stages() {
            let role = classify(stage).expect("fixture stages have bindings");
            register_role(&registry, stage.name(), role);
        }

        Self {
            pipeline: definition,
            registry,
        }
    }

    /// The three-stage `http | transform | log` pipeline.
    #[must_use]
    pub fn http_transform_log() -> Self {
        Self::linear("partitioned", &["http", "transform", "log"])
    }

    /// Registers a library under the given name.
    #[must_use]
    pub fn with_library(self, name: &str) -> Self {
        self.registry.register(
            name,
            ArtifactType::Library,
            fixture_coordinates(name, ArtifactType::Library),
        );
        self
    }
}

fn register_role(registry: &InMemoryArtifactRegistry, name: &str, role: StageRole) {
    let artifact_type = role.artifact_type();
    registry.register(name, artifact_type, fixture_coordinates(name, artifact_type));
}
