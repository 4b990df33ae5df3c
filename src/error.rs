use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures surfaced by the post store and its codec.
///
/// `Corrupt` never reaches a caller of the listing operations: a post that
/// fails to decode is skipped there and looked up as `NotFound`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("post not found: {0}")]
    NotFound(String),

    #[error("slug already exists: {0}")]
    SlugConflict(String),

    #[error("corrupt post at {}: {reason}", path.display())]
    Corrupt {
        path: PathBuf,
        reason: String,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        StoreError::Validation { field, message: message.into() }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StoreError::Corrupt { path: path.into(), reason: reason.into() }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        StoreError::Io { context: context.into(), source }
    }
}
