//! Validation pass over a finished build.
//!
//! Every canonical entity is checked; one entity failing never stops the
//! others. Aliases are skipped since they share their target's entity.

use crate::entity::EntityError;
use crate::registry::Registry;

/// One entity breaking one of its rules.
#[derive(Debug)]
pub struct ValidationFailure {
    /// Virtual path of the entity.
    pub path: String,
    pub error: EntityError,
}

/// Validate every entity of `registry`, collecting all failures.
///
/// An empty result means the build is valid.
pub fn validate_registry(registry: &Registry) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();
    for (path, entity) in registry.entries() {
        match entity.validate() {
            Ok(()) => tracing::debug!(path, "Valid"),
            Err(error) => {
                tracing::debug!(path, error = %error, "Invalid");
                failures.push(ValidationFailure {
                    path: path.to_string(),
                    error,
                });
            }
        }
    }
    failures
}
