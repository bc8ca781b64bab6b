//! CLI support for jstl-el
//!
//! Provides programmatic access to the CLI functionality so other tools can
//! embed the same checks.

mod check;
mod convert;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use convert::{context_from_json, init_parameters, json_to_value, value_to_json};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Syntax or strict-mode evaluation error
    #[error(transparent)]
    El(#[from] crate::ElError),

    /// JSON parsing error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed page context document
    #[error("Invalid context: {0}")]
    Context(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<crate::ParseError> for CliError {
    fn from(e: crate::ParseError) -> Self {
        CliError::El(e.into())
    }
}
