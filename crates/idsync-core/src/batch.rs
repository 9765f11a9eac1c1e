//! Batch operation result types
//!
//! Every bulk export or import settles all of its per-item operations before
//! reporting. A failed item never aborts its siblings; it is recorded here.

use std::future::Future;
use std::time::Instant;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{SyncError, SyncResult};

/// Status of a single batch item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchItemStatus {
    /// Operation completed successfully
    Success,
    /// Operation failed
    Failed,
    /// Item skipped (tolerated remote quirk, missing reference)
    Skipped,
}

/// Result for a single item in a batch operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemResult {
    /// Position in the batch (0-based)
    pub index: usize,
    /// Entity identifier or name
    pub name: String,
    /// Result status
    pub status: BatchItemStatus,
    /// Error message or skip reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    pub fn success(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            status: BatchItemStatus::Success,
            error: None,
        }
    }

    pub fn failed(index: usize, name: String, error: String) -> Self {
        Self {
            index,
            name,
            status: BatchItemStatus::Failed,
            error: Some(error),
        }
    }

    pub fn skipped(index: usize, name: String, reason: String) -> Self {
        Self {
            index,
            name,
            status: BatchItemStatus::Skipped,
            error: Some(reason),
        }
    }
}

/// Summary of a completed batch operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Type of operation performed
    pub operation: String,
    /// Total items attempted
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub skipped_count: usize,
    /// Per-item results, ordered by index
    pub items: Vec<BatchItemResult>,
    /// Total operation duration in milliseconds
    pub duration_ms: u64,
}

impl BatchResult {
    /// Create a new empty batch result
    pub fn new(operation: &str, total: usize) -> Self {
        Self {
            operation: operation.to_string(),
            total,
            success_count: 0,
            failure_count: 0,
            skipped_count: 0,
            items: Vec::with_capacity(total),
            duration_ms: 0,
        }
    }

    pub fn add_success(&mut self, index: usize, name: String) {
        self.success_count += 1;
        self.items.push(BatchItemResult::success(index, name));
    }

    pub fn add_failure(&mut self, index: usize, name: String, error: String) {
        self.failure_count += 1;
        self.items.push(BatchItemResult::failed(index, name, error));
    }

    pub fn add_skipped(&mut self, index: usize, name: String, reason: String) {
        self.skipped_count += 1;
        self.items.push(BatchItemResult::skipped(index, name, reason));
    }

    /// Record the outcome of one item.
    ///
    /// Tolerated vendor quirks count as skipped, not failed.
    pub fn record(&mut self, index: usize, name: String, outcome: SyncResult<()>) {
        match outcome {
            Ok(()) => self.add_success(index, name),
            Err(e) if e.is_tolerated() => {
                warn!(item = %name, error = %e, "skipping tolerated remote error");
                self.add_skipped(index, name, e.to_string());
            }
            Err(e) => {
                error!(item = %name, error = %e, "batch item failed");
                self.add_failure(index, name, e.to_string());
            }
        }
    }

    /// Fold another batch's items into this one, reindexing them after ours.
    pub fn merge(&mut self, other: BatchResult) {
        let offset = self.total;
        self.total += other.total;
        self.success_count += other.success_count;
        self.failure_count += other.failure_count;
        self.skipped_count += other.skipped_count;
        self.duration_ms += other.duration_ms;
        self.items.extend(other.items.into_iter().map(|mut item| {
            item.index += offset;
            item
        }));
    }

    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// Check if all items succeeded
    pub fn all_succeeded(&self) -> bool {
        self.failure_count == 0 && self.skipped_count == 0
    }

    /// Check if any items failed
    pub fn has_failures(&self) -> bool {
        self.failure_count > 0
    }

    pub fn successful_items(&self) -> impl Iterator<Item = &BatchItemResult> {
        self.items
            .iter()
            .filter(|i| i.status == BatchItemStatus::Success)
    }

    pub fn failed_items(&self) -> impl Iterator<Item = &BatchItemResult> {
        self.items
            .iter()
            .filter(|i| i.status == BatchItemStatus::Failed)
    }

    /// Emit the summary as a tracing event.
    pub fn log_summary(&self) {
        info!(
            operation = %self.operation,
            total = self.total,
            succeeded = self.success_count,
            failed = self.failure_count,
            skipped = self.skipped_count,
            duration_ms = self.duration_ms,
            "batch complete"
        );
    }
}

/// Run one future per item, wait for all of them, and collect the outcomes.
///
/// Futures run concurrently; nothing is cancelled when one fails.
pub async fn settle_all<I, F, Fut>(operation: &str, items: I, op: F) -> BatchResult
where
    I: IntoIterator<Item = String>,
    F: Fn(String) -> Fut,
    Fut: Future<Output = SyncResult<()>>,
{
    let start = Instant::now();
    let names: Vec<String> = items.into_iter().collect();
    let outcomes = join_all(names.iter().cloned().map(&op)).await;

    let mut result = BatchResult::new(operation, names.len());
    for (index, (name, outcome)) in names.into_iter().zip(outcomes).enumerate() {
        result.record(index, name, outcome);
    }
    result.set_duration(start.elapsed().as_millis() as u64);
    result
}

/// Build a batch result from outcomes already settled in order.
pub fn from_outcomes<I>(operation: &str, outcomes: I) -> BatchResult
where
    I: IntoIterator<Item = (String, SyncResult<()>)>,
{
    let outcomes: Vec<(String, SyncResult<()>)> = outcomes.into_iter().collect();
    let mut result = BatchResult::new(operation, outcomes.len());
    for (index, (name, outcome)) in outcomes.into_iter().enumerate() {
        result.record(index, name, outcome);
    }
    result
}

/// Convert a failed batch into a single error for callers that need one.
pub fn into_result(batch: BatchResult) -> SyncResult<BatchResult> {
    if batch.has_failures() {
        let names: Vec<&str> = batch.failed_items().map(|i| i.name.as_str()).collect();
        return Err(SyncError::Validation(format!(
            "{} of {} items failed: {}",
            batch.failure_count,
            batch.total,
            names.join(", ")
        )));
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UNSUPPORTED_IN_CLOUD_MESSAGE;

    #[test]
    fn test_batch_item_result_failed() {
        let result = BatchItemResult::failed(1, "sync".to_string(), "boom".to_string());

        assert_eq!(result.index, 1);
        assert_eq!(result.status, BatchItemStatus::Failed);
        assert_eq!(result.error, Some("boom".to_string()));
    }

    #[test]
    fn test_batch_result_add_items() {
        let mut result = BatchResult::new("import", 3);

        result.add_success(0, "managed".to_string());
        result.add_failure(1, "sync".to_string(), "Error".to_string());
        result.add_skipped(2, "ui/configuration".to_string(), "Skipped".to_string());

        assert_eq!(result.success_count, 1);
        assert_eq!(result.failure_count, 1);
        assert_eq!(result.skipped_count, 1);
        assert_eq!(result.items.len(), 3);
        assert!(!result.all_succeeded());
        assert!(result.has_failures());
    }

    #[test]
    fn test_record_classifies_tolerated_errors_as_skipped() {
        let mut result = BatchResult::new("export", 2);
        result.record(
            0,
            "audit".to_string(),
            Err(SyncError::Transport {
                status: 403,
                message: UNSUPPORTED_IN_CLOUD_MESSAGE.to_string(),
            }),
        );
        result.record(1, "managed".to_string(), Ok(()));

        assert_eq!(result.skipped_count, 1);
        assert_eq!(result.success_count, 1);
        assert!(!result.has_failures());
    }

    #[test]
    fn test_merge_reindexes() {
        let mut first = from_outcomes("import", vec![("a".to_string(), Ok(()))]);
        let second = from_outcomes(
            "import",
            vec![(
                "b".to_string(),
                Err(SyncError::Validation("bad".to_string())),
            )],
        );
        first.merge(second);

        assert_eq!(first.total, 2);
        assert_eq!(first.items[1].index, 1);
        assert_eq!(first.failure_count, 1);
    }

    #[tokio::test]
    async fn test_settle_all_waits_for_every_item() {
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let result = settle_all("write", ids, |id| async move {
            if id == "b" {
                Err(SyncError::Transport {
                    status: 500,
                    message: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        })
        .await;

        assert_eq!(result.total, 3);
        assert_eq!(result.success_count, 2);
        assert_eq!(result.failure_count, 1);
        let failed: Vec<&str> = result.failed_items().map(|i| i.name.as_str()).collect();
        assert_eq!(failed, vec!["b"]);
    }

    #[test]
    fn test_into_result_reports_failed_names() {
        let batch = from_outcomes(
            "import",
            vec![
                ("a".to_string(), Ok(())),
                ("b".to_string(), Err(SyncError::not_found("b"))),
            ],
        );
        let err = into_result(batch).unwrap_err();
        assert!(err.to_string().contains("1 of 2 items failed: b"));
    }
}
