//! Error types for algoviz-core.

use thiserror::Error;

/// Result type for algoviz-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by step sources and visual models.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Parameters rejected before any step was produced.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A step does not fit the current state of the model.
    #[error("inconsistent step: {0}")]
    InconsistentStep(String),

    /// A step carries a mutation the model cannot perform at all.
    #[error("{model} model cannot apply {mutation} mutation")]
    UnsupportedMutation {
        model: &'static str,
        mutation: &'static str,
    },

    /// A referenced element does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub(crate) fn inconsistent(msg: impl Into<String>) -> Self {
        Error::InconsistentStep(msg.into())
    }
}
