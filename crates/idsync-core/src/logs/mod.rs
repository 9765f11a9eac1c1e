//! Platform log filtering, tailing and bounded fetches.

pub mod filter;
pub mod levels;
pub mod noise;
pub mod tail;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use filter::{resolve_payload_level, LogFilter};
pub use levels::{LevelSet, LevelTable};
pub use noise::NoiseFilter;
pub use tail::{fetch_logs, tail_logs, LogSink, LogStats, TAIL_INTERVAL};

/// Content type of unstructured log entries.
pub const PLAIN_TEXT_TYPE: &str = "text/plain";

/// One entry from the log stream.
///
/// Structured entries carry an object payload with `logger`, `level` and
/// `transactionId`; `text/plain` entries carry a bare string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogEntry {
    /// Structured entry with the given payload.
    pub fn structured(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            payload,
            timestamp: None,
            kind: kind.into(),
            source: None,
            extra: Map::new(),
        }
    }

    /// `text/plain` entry.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::structured(PLAIN_TEXT_TYPE, Value::String(text.into()))
    }

    pub fn logger(&self) -> Option<&str> {
        self.payload.get("logger").and_then(Value::as_str)
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.payload.get("transactionId").and_then(Value::as_str)
    }
}
