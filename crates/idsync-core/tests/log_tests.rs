//! Tail and bounded fetch loops with the in-memory remote.

mod common;

use std::time::Duration;

use common::*;
use idsync_core::logs::{fetch_logs, tail_logs, LogStats, TAIL_INTERVAL};
use idsync_core::prelude::*;
use tokio_util::sync::CancellationToken;

const SESSION_LOGGER: &str = "org.forgerock.openam.session.SessionService";

fn warn_filter() -> LogFilter {
    LogFilter::new(LevelTable::standard().resolve("WARN").unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_tail_follows_cursor_until_cancelled() {
    let remote = MemoryRemote::new().with_tail_pages(vec![
        Page::more(
            vec![
                am_entry("ERROR", SESSION_LOGGER, "tx-1", "first"),
                am_entry("DEBUG", SESSION_LOGGER, "tx-1", "chatty"),
            ],
            "c1",
        ),
        Page::more(vec![am_entry("WARNING", SESSION_LOGGER, "tx-2", "second")], "c2"),
    ]);
    let filter = warn_filter();
    let cancel = CancellationToken::new();
    let mut sink: Vec<LogEntry> = Vec::new();

    let stopper = async {
        tokio::time::sleep(Duration::from_millis(12_000)).await;
        cancel.cancel();
    };
    let (stats, ()) = tokio::join!(
        tail_logs(
            &remote,
            "am-core",
            &filter,
            None,
            TAIL_INTERVAL,
            &mut sink,
            &cancel,
        ),
        stopper
    );
    let stats = stats.unwrap();

    assert_eq!(stats.polls, 3);
    assert_eq!(stats.received, 3);
    assert_eq!(stats.emitted, 2);
    let messages: Vec<&str> = sink
        .iter()
        .map(|e| e.payload["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, vec!["first", "second"]);
    assert_eq!(
        remote.cursors(),
        vec![None, Some("c1".to_string()), Some("c2".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_tail_drops_noise_and_filters_transaction() {
    let remote = MemoryRemote::new().with_tail_pages(vec![Page::last(vec![
        am_entry(
            "ERROR",
            "org.forgerock.openam.auth.trees.engine.AuthTreeExecutor",
            "tx-1",
            "noise",
        ),
        am_entry("ERROR", SESSION_LOGGER, "tx-1-abc", "kept"),
        am_entry("ERROR", SESSION_LOGGER, "tx-2", "other transaction"),
    ])]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    // Already cancelled: the loop stops before the first poll.
    let mut sink: Vec<LogEntry> = Vec::new();
    let filter = warn_filter().with_transaction("tx-1");
    let stats = tail_logs(&remote, "am-core", &filter, None, TAIL_INTERVAL, &mut sink, &cancel)
        .await
        .unwrap();
    assert_eq!(stats, LogStats::default());

    let cancel = CancellationToken::new();
    let stopper = async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        cancel.cancel();
    };
    let (stats, ()) = tokio::join!(
        tail_logs(&remote, "am-core", &filter, None, TAIL_INTERVAL, &mut sink, &cancel),
        stopper
    );
    assert_eq!(stats.unwrap().emitted, 1);
    assert_eq!(sink[0].payload["message"], "kept");
}

#[tokio::test]
async fn test_fetch_walks_pages_and_applies_search() {
    let entries = vec![
        am_entry("ERROR", SESSION_LOGGER, "tx-1", "login failed for bob"),
        am_entry("ERROR", SESSION_LOGGER, "tx-2", "login failed for alice"),
        am_entry("INFO", SESSION_LOGGER, "tx-3", "login succeeded for bob"),
        LogEntry::plain("2024-05-01T10:00:00Z: bob"),
        am_entry("SEVERE", SESSION_LOGGER, "tx-4", "bob locked out"),
    ];
    let remote = MemoryRemote::new().with_fetch_pages(idsync_core::pager::chunk_pages(&entries, 2));
    let filter = warn_filter();
    let cancel = CancellationToken::new();
    let mut sink: Vec<LogEntry> = Vec::new();

    let stats = fetch_logs(
        &remote,
        "am-core",
        "2024-05-01T00:00:00Z",
        "2024-05-01T12:00:00Z",
        &filter,
        Some("bob"),
        &mut sink,
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(stats.polls, 3);
    assert_eq!(stats.received, 5);
    let messages: Vec<&str> = sink
        .iter()
        .map(|e| e.payload["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, vec!["login failed for bob", "bob locked out"]);
}

#[tokio::test]
async fn test_fetch_reports_cancellation() {
    let entries = vec![am_entry("ERROR", SESSION_LOGGER, "tx-1", "one")];
    let remote = MemoryRemote::new().with_fetch_pages(vec![Page::last(entries)]);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let filter = warn_filter();
    let mut sink: Vec<LogEntry> = Vec::new();

    let err = fetch_logs(
        &remote,
        "am-core",
        "2024-05-01T00:00:00Z",
        "2024-05-01T12:00:00Z",
        &filter,
        None,
        &mut sink,
        &cancel,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SyncError::Cancelled));
    assert!(sink.is_empty());
}
