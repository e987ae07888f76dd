//! Error types for secret export runs.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ExportError`].
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that can end an export run.
///
/// Every variant maps onto one [`ErrorKind`]. The `Display` form is what the
/// runner reports as the failure reason, so collaborator messages are carried
/// through unchanged.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A required input was missing or blank.
    #[error("Input required and not supplied: {0}")]
    MissingInput(String),

    /// The credential or the secret client could not be built.
    #[error("{0}")]
    Credential(String),

    /// Listing the vault's secrets failed.
    #[error("{0}")]
    Enumerate(String),

    /// Fetching a single secret failed.
    #[error("{message}")]
    Fetch {
        /// Secret name that was requested
        name: String,
        /// Message reported by the store
        message: String,
    },

    /// Writing to a runner file failed.
    #[error("failed to write {}: {source}", path.display())]
    Sink {
        /// File that was being appended to
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Other error (catch-all).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of an [`ExportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required input missing or blank; raised before any network call.
    Configuration,
    /// Invalid credential parameters or client construction failure.
    Construction,
    /// Enumerating the vault failed.
    Resolution,
    /// A requested secret could not be fetched.
    Fetch,
    /// A runner file could not be written.
    Sink,
    /// Anything else.
    Other,
}

impl ExportError {
    /// Creates a fetch error for `name` from any displayable fault.
    ///
    /// # Example
    ///
    /// ```
    /// use keyvault_export::{ErrorKind, ExportError};
    ///
    /// let err = ExportError::fetch("db-host", "SecretNotFound");
    /// assert_eq!(err.kind(), ErrorKind::Fetch);
    /// assert_eq!(err.to_string(), "SecretNotFound");
    /// ```
    pub fn fetch(name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Fetch {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Creates a sink error for the file at `path`.
    pub fn sink(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Sink {
            path: path.into(),
            source,
        }
    }

    /// Returns the taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput(_) => ErrorKind::Configuration,
            Self::Credential(_) => ErrorKind::Construction,
            Self::Enumerate(_) => ErrorKind::Resolution,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Sink { .. } => ErrorKind::Sink,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}
