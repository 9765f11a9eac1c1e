//! Terminal output helpers for consistent CLI formatting

use idsync_core::batch::{BatchItemStatus, BatchResult};
use serde::Serialize;

/// Check if color output is enabled
fn use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message (green checkmark)
pub fn print_success(message: &str) {
    if use_color() {
        println!("\x1b[32m✓\x1b[0m {}", message);
    } else {
        println!("OK: {}", message);
    }
}

/// Print a warning message (yellow)
pub fn print_warning(message: &str) {
    if use_color() {
        eprintln!("\x1b[33mWarning:\x1b[0m {}", message);
    } else {
        eprintln!("Warning: {}", message);
    }
}

/// Print an info message (blue)
pub fn print_info(message: &str) {
    if use_color() {
        println!("\x1b[34mℹ\x1b[0m {}", message);
    } else {
        println!("Info: {}", message);
    }
}

/// Print `value` as compact single-line JSON
pub fn print_json_line<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{}", line),
        Err(e) => print_warning(&format!("unprintable entry: {e}")),
    }
}

/// One-line batch summary
pub fn batch_summary(batch: &BatchResult) -> String {
    format!(
        "{}: {} succeeded, {} failed, {} skipped ({} total)",
        batch.operation, batch.success_count, batch.failure_count, batch.skipped_count, batch.total
    )
}

/// Print the summary, then every failed or skipped item
pub fn print_batch(batch: &BatchResult) {
    if batch.has_failures() {
        print_warning(&batch_summary(batch));
    } else {
        print_success(&batch_summary(batch));
    }
    for item in &batch.items {
        let reason = item.error.as_deref().unwrap_or("-");
        match item.status {
            BatchItemStatus::Failed => eprintln!("  failed   {}: {}", item.name, reason),
            BatchItemStatus::Skipped => eprintln!("  skipped  {}: {}", item.name, reason),
            BatchItemStatus::Success => {}
        }
    }
}
