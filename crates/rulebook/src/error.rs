//! Facade errors.

use rulebook_ast::error::CompileError;
use thiserror::Error;

/// Result type of the facade entry points.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a compile started from source text or a decoded rule set.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid YAML: {0}")]
    Decode(#[from] serde_yaml::Error),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl Error {
    /// The compile error, if compilation (not decoding) failed.
    pub fn as_compile_error(&self) -> Option<&CompileError> {
        match self {
            Error::Compile(error) => Some(error),
            Error::Decode(_) => None,
        }
    }
}
