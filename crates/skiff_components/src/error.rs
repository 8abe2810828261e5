//! Error types for the component builders.

use skiff_core::CoreError;
use skiff_templates::TemplateError;
use thiserror::Error;

/// Result type alias for component operations.
pub type ComponentResult<T> = Result<T, ComponentError>;

/// Errors that abort a component build.
#[derive(Error, Debug)]
pub enum ComponentError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),
}
