//! Error types for block iteration.
//!
//! [`RenderError`] is the single error type returned by helpers, blocks and
//! collaborators. Errors raised by a caller's block are carried through
//! unchanged; iteration never recovers from them locally.

use minijinja::value::ValueKind;
use thiserror::Error;

/// Errors that can occur while iterating a block.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The value was routed to record iteration but exposes no fields.
    #[error("cannot enumerate fields of a {kind:?} value")]
    NotEnumerable { kind: ValueKind },

    /// A block callback reported a failure.
    #[error("block render failed: {0}")]
    Block(String),

    /// No helper is registered under the requested name.
    #[error("helper not found: {0}")]
    HelperNotFound(String),

    /// Invalid helper configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failure inside MiniJinja (value access or template rendering).
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl From<serde_yaml::Error> for RenderError {
    fn from(err: serde_yaml::Error) -> Self {
        RenderError::Config(err.to_string())
    }
}

/// Result type for iteration operations.
pub type Result<T> = std::result::Result<T, RenderError>;
