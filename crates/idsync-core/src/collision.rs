//! Rename-on-conflict policy for named resources.
//!
//! When the remote rejects a write because the name is taken, the write is
//! retried under the same id with `<name> - imported (<n>)`, incrementing `n`
//! until the remote accepts it or the attempt bound is reached.

use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};

/// Upper bound on renames for a single resource.
pub const MAX_RENAME_ATTEMPTS: u32 = 1000;

static IMPORTED_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.* - imported) \(([0-9]+)\)$").expect("IMPORTED_SUFFIX is a valid regex pattern")
});

/// The name to try after `name` collided.
pub fn next_name(name: &str) -> String {
    if let Some(caps) = IMPORTED_SUFFIX.captures(name) {
        if let Ok(n) = caps[2].parse::<u64>() {
            return format!("{} ({})", &caps[1], n + 1);
        }
    }
    format!("{name} - imported (1)")
}

/// Write under `name`, renaming on conflict.
///
/// `write` is called with each candidate name. Returns the name that was
/// finally accepted. Errors other than a conflict are returned at once.
pub async fn write_with_rename<F, Fut>(name: &str, mut write: F) -> SyncResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = SyncResult<()>>,
{
    let mut candidate = name.to_string();
    for attempt in 0..=MAX_RENAME_ATTEMPTS {
        match write(candidate.clone()).await {
            Ok(()) => {
                debug!(name = %candidate, attempt, "write accepted");
                return Ok(candidate);
            }
            Err(e) if e.is_conflict() => {
                let renamed = next_name(&candidate);
                warn!(from = %candidate, to = %renamed, "name already in use, renaming");
                candidate = renamed;
            }
            Err(e) => return Err(e),
        }
    }
    Err(SyncError::RenameExhausted {
        name: name.to_string(),
        attempts: MAX_RENAME_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[test]
    fn test_next_name() {
        assert_eq!(next_name("Test"), "Test - imported (1)");
        assert_eq!(next_name("Test - imported (1)"), "Test - imported (2)");
        assert_eq!(next_name("Test - imported (41)"), "Test - imported (42)");
        assert_eq!(next_name("Test (3)"), "Test (3) - imported (1)");
    }

    fn conflict() -> SyncError {
        SyncError::Conflict {
            message: "name in use".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_write_wins_without_rename() {
        let name = write_with_rename("Test", |_| async { Ok(()) }).await.unwrap();
        assert_eq!(name, "Test");
    }

    #[tokio::test]
    async fn test_rename_until_free() {
        let taken: Mutex<HashSet<String>> = Mutex::new(
            ["Test", "Test - imported (1)"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        let name = write_with_rename("Test", |candidate| {
            let free = !taken.lock().unwrap().contains(&candidate);
            async move {
                if free {
                    Ok(())
                } else {
                    Err(conflict())
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(name, "Test - imported (2)");
    }

    #[tokio::test]
    async fn test_non_conflict_error_is_not_retried() {
        let mut calls = 0;
        let result = write_with_rename("Test", |_| {
            calls += 1;
            async {
                Err(SyncError::Transport {
                    status: 500,
                    message: "boom".to_string(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(SyncError::Transport { status: 500, .. })));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_exhaustion_is_bounded() {
        let mut calls = 0u32;
        let result = write_with_rename("Test", |_| {
            calls += 1;
            async { Err(conflict()) }
        })
        .await;
        assert!(matches!(
            result,
            Err(SyncError::RenameExhausted { attempts: MAX_RENAME_ATTEMPTS, .. })
        ));
        assert_eq!(calls, MAX_RENAME_ATTEMPTS + 1);
    }
}
