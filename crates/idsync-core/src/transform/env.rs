//! Environment parameterization.
//!
//! Export replaces every literal occurrence of a mapped value with `${key}`;
//! import turns `${key}` back into whatever value the import-time map holds.
//! Both passes are plain text replacement over the serialized JSON, so a
//! value that also appears inside an unrelated string is replaced there too.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::UTF_8;
use java_properties::{PropertiesError, PropertiesIter};
use tracing::debug;

use crate::error::{SyncError, SyncResult};

/// Ordered mapping from variable name to literal value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentMap {
    entries: Vec<(String, String)>,
}

impl EnvironmentMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from pairs, keeping their order.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::new();
        for (k, v) in pairs {
            map.insert(k, v);
        }
        map
    }

    /// Load a `key=value` properties file.
    pub fn load(path: &Path) -> SyncResult<Self> {
        let file = File::open(path).map_err(|e| SyncError::io(path, e))?;
        let map = Self::read(BufReader::new(file))
            .map_err(|e| SyncError::Validation(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), entries = map.len(), "loaded environment map");
        Ok(map)
    }

    /// Parse properties text.
    ///
    /// Follows Java properties syntax (`#`/`!` comments, `=`, `:` or
    /// whitespace separators, backslash escapes, line continuations) but
    /// decodes as UTF-8.
    /// Values are trimmed; entries with an empty key or value are ignored.
    pub fn parse(text: &str) -> SyncResult<Self> {
        Self::read(text.as_bytes()).map_err(|e| SyncError::Validation(e.to_string()))
    }

    fn read<R: Read>(reader: R) -> Result<Self, PropertiesError> {
        let mut map = Self::new();
        PropertiesIter::new_with_encoding(reader, UTF_8).read_into(|key, value| {
            let value = value.trim();
            if !key.is_empty() && !value.is_empty() {
                map.insert(key, value);
            }
        })?;
        Ok(map)
    }

    /// Insert or replace a variable, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a variable's value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(key, value)` pairs in load order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace literal values with `${key}` placeholders.
    pub fn substitute(&self, text: &str) -> String {
        self.iter().fold(text.to_string(), |acc, (key, value)| {
            acc.replace(value, &placeholder(key))
        })
    }

    /// Replace `${key}` placeholders with literal values.
    pub fn unsubstitute(&self, text: &str) -> String {
        self.iter().fold(text.to_string(), |acc, (key, value)| {
            acc.replace(&placeholder(key), value)
        })
    }
}

fn placeholder(key: &str) -> String {
    format!("${{{key}}}")
}
