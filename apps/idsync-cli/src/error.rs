//! CLI error types and exit codes

use idsync_core::error::SyncError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Authentication required
/// - 3: Network error
/// - 4: Validation error
/// - 5: Server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("No tenant configured. Pass --host or set IDSYNC_HOST.")]
    NoHost,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection failed: {0}\n\nTroubleshooting:\n  - Check your internet connection\n  - Verify the tenant URL is correct\n  - Try again in a few moments")]
    ConnectionFailed(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("{operation}: {failed} of {total} items failed")]
    BatchFailed {
        operation: String,
        failed: usize,
        total: usize,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NoHost | CliError::AuthenticationFailed(_) => 2,
            CliError::Network(_) | CliError::ConnectionFailed(_) => 3,
            CliError::Validation(_) | CliError::NotFound(_) | CliError::Conflict(_) => 4,
            CliError::Server(_) => 5,
            CliError::Api { status, .. } => {
                if *status >= 500 {
                    5
                } else if *status == 401 || *status == 403 {
                    2
                } else {
                    4
                }
            }
            CliError::Config(_)
            | CliError::Io(_)
            | CliError::BatchFailed { .. }
            | CliError::Cancelled => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::NoHost => Some("Set 'host' in config.json or pass --host <URL>."),
            CliError::AuthenticationFailed(_) => {
                Some("Check IDSYNC_ACCESS_TOKEN (or the log API key and secret for 'logs').")
            }
            CliError::ConnectionFailed(_) => Some("Check your network connection and try again."),
            CliError::BatchFailed { .. } => Some("Re-run with -v to see each failed item."),
            _ => None,
        }
    }
}

impl From<SyncError> for CliError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Transport { status, message } => match status {
                401 => CliError::AuthenticationFailed(message),
                s if s >= 500 => CliError::Server(format!("status {s}: {message}")),
                _ => CliError::Api { status, message },
            },
            SyncError::Connection(message) => CliError::ConnectionFailed(message),
            SyncError::Conflict { message } => CliError::Conflict(message),
            e @ SyncError::RenameExhausted { .. } => CliError::Conflict(e.to_string()),
            SyncError::NotFound { what } => CliError::NotFound(what),
            SyncError::Validation(message) | SyncError::InvalidBundle(message) => {
                CliError::Validation(message)
            }
            e @ (SyncError::Json { .. } | SyncError::Encoding(_)) => {
                CliError::Validation(e.to_string())
            }
            e @ SyncError::Io { .. } => CliError::Io(e.to_string()),
            SyncError::Cancelled => CliError::Cancelled,
        }
    }
}

impl From<reqwest::Error> for CliError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            CliError::ConnectionFailed(e.to_string())
        } else if e.is_timeout() {
            CliError::Network("Request timed out".to_string())
        } else {
            CliError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Config(format!("JSON error: {}", e))
    }
}
