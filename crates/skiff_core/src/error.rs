//! Error types for the core module.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while declaring resources against an engine.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Lookup failed for {kind} '{name}': {message}")]
    LookupFailed {
        kind: String,
        name: String,
        message: String,
    },

    #[error("Declaration of {resource_type} '{name}' rejected: {message}")]
    DeclarationRejected {
        resource_type: String,
        name: String,
        message: String,
    },

    #[error("Resource already declared: {0}")]
    DuplicateResource(String),

    #[error("Unknown dependency {dependency} for {urn}")]
    UnknownDependency { urn: String, dependency: String },

    #[error("Dependency {dependency} of {urn} is declared after it")]
    DependencyOrder { urn: String, dependency: String },

    #[error("{urn} references {reference} without depending on it")]
    UndeclaredReference { urn: String, reference: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
