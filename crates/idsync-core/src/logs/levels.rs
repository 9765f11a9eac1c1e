//! Severity families.
//!
//! Requesting a level selects that level's family and every more severe
//! one. Names within a family are synonyms. Numeric shorthand `0`-`3`
//! selects by family index and `4` means everything.

use std::collections::HashMap;

use crate::error::{SyncError, SyncResult};

/// Marker that disables level filtering.
pub const ALL_LEVELS: &str = "ALL";

/// Severity families, most severe first.
pub const SEVERITY_FAMILIES: &[&[&str]] = &[
    &["SEVERE", "ERROR", "FATAL"],
    &["WARNING", "WARN", "CONFIG"],
    &["INFO", "INFORMATION"],
    &["DEBUG", "FINE", "FINER", "FINEST"],
];

/// The resolved set of levels an entry may have to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSet {
    levels: Vec<String>,
}

impl LevelSet {
    /// A set that matches every entry.
    pub fn all() -> Self {
        Self {
            levels: vec![ALL_LEVELS.to_string()],
        }
    }

    pub fn from_levels<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.levels.first().map(String::as_str) == Some(ALL_LEVELS)
    }

    /// Whether an entry with `level` passes. An unknown level only passes
    /// an `ALL` set.
    pub fn matches(&self, level: Option<&str>) -> bool {
        if self.is_all() {
            return true;
        }
        level.is_some_and(|l| self.levels.iter().any(|s| s == l))
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }
}

/// Lookup from a requested level to its [`LevelSet`].
#[derive(Debug, Clone)]
pub struct LevelTable {
    by_name: HashMap<String, LevelSet>,
    by_number: Vec<String>,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl LevelTable {
    /// Table built from [`SEVERITY_FAMILIES`].
    pub fn standard() -> Self {
        Self::from_families(SEVERITY_FAMILIES)
    }

    /// Build a table where each family includes every family before it.
    pub fn from_families(families: &[&[&str]]) -> Self {
        let mut by_name = HashMap::new();
        let mut by_number = Vec::with_capacity(families.len() + 1);
        let mut cumulative: Vec<String> = Vec::new();

        for family in families {
            cumulative.extend(family.iter().map(|s| s.to_string()));
            for name in *family {
                by_name.insert(name.to_string(), LevelSet::from_levels(cumulative.clone()));
            }
            if let Some(first) = family.first() {
                by_number.push(first.to_string());
            }
        }
        by_name.insert(ALL_LEVELS.to_string(), LevelSet::all());
        by_number.push(ALL_LEVELS.to_string());

        Self { by_name, by_number }
    }

    /// Resolve a level name or number, case-insensitively.
    pub fn resolve(&self, level: &str) -> SyncResult<LevelSet> {
        let key = level.trim().to_ascii_uppercase();
        let name = match key.parse::<usize>() {
            Ok(n) => self
                .by_number
                .get(n)
                .ok_or_else(|| SyncError::Validation(format!("unknown log level '{level}'")))?,
            Err(_) => &key,
        };
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| SyncError::Validation(format!("unknown log level '{level}'")))
    }
}
