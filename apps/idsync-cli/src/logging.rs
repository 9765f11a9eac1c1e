//! Diagnostic logging setup
//!
//! Diagnostics go to stderr through `tracing`; stdout carries only command
//! output. Verbosity comes from `-v`/`-q` unless `RUST_LOG` is set.

use tracing_subscriber::EnvFilter;

/// Filter directive for the given flags
pub fn directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(verbose, quiet)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
