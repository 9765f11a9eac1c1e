//! Per-entry log predicate.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::levels::LevelSet;
use super::noise::NoiseFilter;
use super::{LogEntry, PLAIN_TEXT_TYPE};

static PLAIN_TEXT_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^:]*):").expect("PLAIN_TEXT_LEVEL is a valid regex pattern")
});

/// The severity of an entry.
///
/// Structured entries use `payload.level`. `text/plain` entries use the text
/// before the first `:`; most of them start with a timestamp rather than a
/// level, so they resolve to something no level set contains.
pub fn resolve_payload_level(entry: &LogEntry) -> Option<&str> {
    if entry.kind != PLAIN_TEXT_TYPE {
        return entry.payload.get("level").and_then(Value::as_str);
    }
    let text = entry.payload.as_str()?;
    PLAIN_TEXT_LEVEL
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Noise, level and transaction filter.
#[derive(Debug, Clone)]
pub struct LogFilter {
    noise: NoiseFilter,
    levels: LevelSet,
    transaction_id: Option<String>,
}

impl LogFilter {
    /// Filter on `levels` with the default noise set.
    pub fn new(levels: LevelSet) -> Self {
        Self {
            noise: NoiseFilter::default_set(),
            levels,
            transaction_id: None,
        }
    }

    /// Replace the noise set.
    pub fn with_noise(mut self, noise: NoiseFilter) -> Self {
        self.noise = noise;
        self
    }

    /// Only keep entries whose transaction id contains `txid`.
    pub fn with_transaction(mut self, txid: impl Into<String>) -> Self {
        self.transaction_id = Some(txid.into());
        self
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if entry.logger().is_some_and(|l| self.noise.contains(l)) || self.noise.contains(&entry.kind) {
            return false;
        }
        if !self.levels.matches(resolve_payload_level(entry)) {
            return false;
        }
        match &self.transaction_id {
            None => true,
            Some(txid) => entry
                .transaction_id()
                .is_some_and(|t| t.contains(txid.as_str())),
        }
    }
}
