//! Tail and bounded fetch loops.

use std::pin::pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::TryStreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::filter::LogFilter;
use super::LogEntry;
use crate::error::{SyncError, SyncResult};
use crate::files;
use crate::pager::paginate;
use crate::remote::LogRemote;

/// Delay between tail polls.
pub const TAIL_INTERVAL: Duration = Duration::from_millis(5000);

/// Receives entries that passed the filter, in remote order.
pub trait LogSink {
    /// An entry from the tail loop.
    fn on_tail(&mut self, entry: &LogEntry);

    /// An entry from a bounded fetch, with its 2-space pretty rendering.
    fn on_fetch(&mut self, entry: &LogEntry, pretty: &str);
}

impl LogSink for Vec<LogEntry> {
    fn on_tail(&mut self, entry: &LogEntry) {
        self.push(entry.clone());
    }

    fn on_fetch(&mut self, entry: &LogEntry, _pretty: &str) {
        self.push(entry.clone());
    }
}

/// Counters from a tail or fetch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogStats {
    /// Remote calls made
    pub polls: usize,
    /// Entries received
    pub received: usize,
    /// Entries handed to the sink
    pub emitted: usize,
}

/// Poll `source` until `cancel` fires.
///
/// Each poll continues from the previous response's cursor, emits matching
/// entries in the order received and then waits `interval`. Cancellation is
/// checked while waiting and while a poll is in flight; it ends the loop
/// with `Ok`. A remote error ends the loop with that error.
pub async fn tail_logs<R, S>(
    remote: &R,
    source: &str,
    filter: &LogFilter,
    cursor: Option<String>,
    interval: Duration,
    sink: &mut S,
    cancel: &CancellationToken,
) -> SyncResult<LogStats>
where
    R: LogRemote + ?Sized,
    S: LogSink + ?Sized,
{
    let mut stats = LogStats::default();
    let mut cursor = cursor;

    loop {
        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            page = remote.tail(source, cursor.clone()) => page?,
        };
        stats.polls += 1;
        for entry in &page.items {
            stats.received += 1;
            if filter.matches(entry) {
                sink.on_tail(entry);
                stats.emitted += 1;
            }
        }
        cursor = page.continuation().map(str::to_string);
        debug!(source, received = page.items.len(), "tail poll");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!(source, polls = stats.polls, emitted = stats.emitted, "tail stopped");
    Ok(stats)
}

/// Walk every page of `source` between `begin` and `end`.
///
/// Entries that pass `filter` are rendered as pretty JSON; when `search` is
/// given, only renderings containing it are emitted. Returns
/// [`SyncError::Cancelled`] if `cancel` fires between pages.
#[allow(clippy::too_many_arguments)]
pub async fn fetch_logs<R, S>(
    remote: &R,
    source: &str,
    begin: &str,
    end: &str,
    filter: &LogFilter,
    search: Option<&str>,
    sink: &mut S,
    cancel: &CancellationToken,
) -> SyncResult<LogStats>
where
    R: LogRemote + ?Sized,
    S: LogSink + ?Sized,
{
    let polls = AtomicUsize::new(0);
    let mut entries = pin!(paginate(|cursor| {
        polls.fetch_add(1, Ordering::Relaxed);
        remote.fetch(source, begin, end, cursor)
    }));

    let mut stats = LogStats::default();
    while let Some(entry) = entries.try_next().await? {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        stats.received += 1;
        if !filter.matches(&entry) {
            continue;
        }
        let pretty = files::to_pretty_json(&entry, "log entry")?;
        if search.is_some_and(|s| !pretty.contains(s)) {
            continue;
        }
        sink.on_fetch(&entry, &pretty);
        stats.emitted += 1;
    }
    stats.polls = polls.load(Ordering::Relaxed);

    info!(source, pages = stats.polls, emitted = stats.emitted, "fetch complete");
    Ok(stats)
}
