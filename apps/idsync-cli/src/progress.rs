//! Spinners for long-running remote operations

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a command waits on the remote
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Start a spinner; hidden when `quiet` is set
    pub fn start(message: &str, quiet: bool) -> Self {
        if quiet {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Clear the spinner from the terminal
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
