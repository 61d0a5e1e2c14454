//! Error types for algoviz-player.

use thiserror::Error;

/// Result type for player operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that end a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A step could not be applied to the visual model.
    #[error("step failed: {0}")]
    Core(#[from] algoviz_core::Error),

    /// The renderer could not draw a frame.
    #[error("render failed: {0}")]
    Render(String),

    /// Nothing has been loaded to play.
    #[error("no program loaded")]
    NoProgram,
}

impl From<algoviz_layout::LayoutError> for Error {
    fn from(err: algoviz_layout::LayoutError) -> Self {
        Error::Render(err.to_string())
    }
}
