//! Custom error types with exit codes

use thiserror::Error;

/// Main error type for git-select operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SelectError {
    /// Configuration Error - invalid environment or cache configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Selection Error - a selection string or descriptor field is malformed
    #[error("Selection error: {message}")]
    Selection { message: String },

    /// Source Error - a selected path was not produced by the checkout
    #[error("Source error: {message}")]
    Source { message: String },

    /// Git Error - Git operation failed
    #[error("Git error: {message}")]
    Git { message: String },

    /// Filesystem Error - file operation failed
    #[error("Filesystem error: {message}")]
    Filesystem { message: String },
}

impl SelectError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Configuration { .. } => 1,
            Self::Selection { .. } => 2,
            Self::Source { .. } => 3,
            Self::Git { .. } => 4,
            Self::Filesystem { .. } => 5,
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a selection error
    #[inline]
    pub fn selection<S: Into<String>>(message: S) -> Self {
        Self::Selection {
            message: message.into(),
        }
    }

    /// Create a source error
    #[inline]
    pub fn from_source<S: Into<String>>(message: S) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create a git error
    #[inline]
    pub fn git<S: Into<String>>(message: S) -> Self {
        Self::Git {
            message: message.into(),
        }
    }

    /// Create a filesystem error
    #[inline]
    pub fn filesystem<S: Into<String>>(message: S) -> Self {
        Self::Filesystem {
            message: message.into(),
        }
    }
}
