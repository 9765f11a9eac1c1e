//! Script syntax gate.
//!
//! Config payloads embed script hooks (`{"type": "text/javascript",
//! "source": ...}`) and script objects carry whole scripts. Both are checked
//! through a [`SyntaxChecker`] before an import writes them, when the caller
//! asks for validation.

pub mod hooks;
pub mod javascript;

use std::fmt;

pub use hooks::{first_invalid_hook, validate_script, validate_script_hooks, HookFailure};
pub use javascript::JavaScriptChecker;

/// Where and why a source failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDiagnostic {
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    pub message: String,
}

impl fmt::Display for SyntaxDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}: {}", self.line, self.column, self.message)
    }
}

/// A syntax checker for one scripting language.
pub trait SyntaxChecker: Send + Sync {
    /// Language name used in messages.
    fn language(&self) -> &'static str;

    /// Check `source`, returning the first problem found.
    fn check(&self, source: &str) -> Result<(), SyntaxDiagnostic>;
}
