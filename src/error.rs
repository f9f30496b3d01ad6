//! Error types for propschema
//!
//! This module defines the fatal error type used throughout the library.
//! Recoverable validation failures are values (see [`crate::exceptions`]);
//! they only become an [`Error`] at fail-fast boundaries: a slot write, a
//! typed value configured with `raise_on_error`, or unused-option reporting.

use thiserror::Error;

use crate::exceptions::ValidationError;

/// Result type alias using the propschema Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for propschema operations
#[derive(Error, Debug)]
pub enum Error {
    /// A constraint rejected a value
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Schema definition or binding error (programmer misuse, always fatal)
    #[error("schema error: {0}")]
    Schema(String),

    /// A pipeline entry or factory is not invocable (programmer misuse)
    #[error("not a callable: {0}")]
    BadCallable(String),

    /// A configuration option holds a value of the wrong shape
    #[error("option error: {0}")]
    Option(String),
}

impl Error {
    /// Return the inner validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}
