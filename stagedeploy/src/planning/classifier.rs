//! Stage role classification from binding markers.

use crate::core::{StageDefinition, StageRole};
use crate::errors::DeployError;

/// Infers the role of a stage from its binding markers.
///
/// # Errors
///
/// Returns [`DeployError::AmbiguousRole`] if the stage has neither marker.
/// The pipeline parser always attaches at least one, so this signals a
/// broken upstream invariant rather than bad user input.
pub fn classify(stage: &StageDefinition) -> Result<StageRole, DeployError> {
    match (stage.has_input_binding(), stage.has_output_binding()) {
        (true, true) => Ok(StageRole::Processor),
        (true, false) => Ok(StageRole::Sink),
        (false, true) => Ok(StageRole::Source),
        (false, false) => Err(DeployError::AmbiguousRole {
            stage: stage.label().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_only_is_source() {
        let stage = StageDefinition::builder("time").output_binding("t.0").build();
        assert_eq!(classify(&stage).unwrap(), StageRole::Source);
    }

    #[test]
    fn test_input_only_is_sink() {
        let stage = StageDefinition::builder("log").input_binding("t.0").build();
        assert_eq!(classify(&stage).unwrap(), StageRole::Sink);
    }

    #[test]
    fn test_both_is_processor() {
        let stage = StageDefinition::builder("filter")
            .input_binding("t.0")
            .output_binding("t.1")
            .build();
        assert_eq!(classify(&stage).unwrap(), StageRole::Processor);
    }

    #[test]
    fn test_neither_is_ambiguous() {
        let stage = StageDefinition::builder("orphan").parameter("level", "info").build();
        let err = classify(&stage).unwrap_err();
        assert!(matches!(err, DeployError::AmbiguousRole { ref stage } if stage == "orphan"));
    }
}
