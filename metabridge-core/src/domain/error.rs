// metabridge-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Invalid source record #{index}: {reason}")]
    #[diagnostic(
        code(metabridge::domain::invalid_record),
        help("Each exported entity must be an object carrying at least a string 'urn'.")
    )]
    InvalidRecord { index: usize, reason: String },

    #[error("Cannot build '{aspect}' for {entity_urn}: {reason}")]
    #[diagnostic(code(metabridge::domain::aspect_build))]
    AspectBuild {
        entity_urn: String,
        aspect: String,
        reason: String,
    },

    #[error("Invalid mutation rule in '{category}': {reason}")]
    #[diagnostic(
        code(metabridge::domain::mutation_rule),
        help("Mutation tokens must be non-empty strings.")
    )]
    InvalidMutationRule { category: String, reason: String },
}
