//! Error types for the synchronization pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `SyncError`.
pub type SyncResult<T> = Result<T, SyncError>;

/// Message the cloud tenant returns for config endpoints it does not expose.
pub const UNSUPPORTED_IN_CLOUD_MESSAGE: &str =
    "This operation is not available in ForgeRock Identity Cloud.";

/// Message returned for a default config object that never exists (OPENIDM-18270).
pub const MISSING_FILEINSTALL_MESSAGE: &str =
    "No configuration exists for id org.apache.felix.fileinstall/openidm";

/// Errors that can occur while exporting, importing or tailing.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote answered with an unexpected status.
    #[error("remote error (status {status}): {message}")]
    Transport { status: u16, message: String },

    /// The remote could not be reached at all.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A named resource collides with an existing one.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// The requested object does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// Content failed a validation gate.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A bundle file is not importable.
    #[error("invalid bundle: {0}")]
    InvalidBundle(String),

    /// The collision policy ran out of candidate names.
    #[error("no free name for '{name}' after {attempts} attempts")]
    RenameExhausted { name: String, attempts: u32 },

    /// Local filesystem failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failure.
    #[error("JSON error in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Base64 payload could not be decoded.
    #[error("invalid base64 script body: {0}")]
    Encoding(String),

    /// A polling loop was stopped by its cancellation token.
    #[error("operation cancelled")]
    Cancelled,
}

impl SyncError {
    /// Build an I/O error tagged with the offending path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a JSON error tagged with what was being processed.
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Build a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Returns `true` for the two vendor quirks that are reported but never
    /// counted as failures.
    #[must_use]
    pub fn is_tolerated(&self) -> bool {
        match self {
            Self::Transport { status, message } => {
                (*status == 403 && message == UNSUPPORTED_IN_CLOUD_MESSAGE)
                    || (*status == 404 && message == MISSING_FILEINSTALL_MESSAGE)
            }
            Self::NotFound { what } => what == MISSING_FILEINSTALL_MESSAGE,
            _ => false,
        }
    }

    /// Returns `true` if this error should trigger the rename policy.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
            || matches!(self, Self::Transport { status: 409, .. })
    }
}
