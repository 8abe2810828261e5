//! Error types for templates.

use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while rendering templates or documents.
///
/// Templates ship inside the binary, so any of these indicates a packaging defect
/// rather than a condition a caller can recover from.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template {template}: no value for placeholder '{placeholder}'")]
    UnknownPlaceholder {
        template: String,
        placeholder: String,
    },

    #[error("Template {template}: malformed token '{token}'")]
    MalformedToken { template: String, token: String },

    #[error("Template {template}: unbalanced conditional block ({message})")]
    UnbalancedBlock { template: String, message: String },

    #[error("Invalid schema for {document}: {message}")]
    InvalidSchema { document: String, message: String },

    #[error("Rendered {document} does not match its schema: {}", errors.join("; "))]
    SchemaViolation {
        document: String,
        errors: Vec<String>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
