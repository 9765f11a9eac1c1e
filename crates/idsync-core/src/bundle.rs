//! Export bundles.
//!
//! A bundle is the unit written to and read from disk: a `meta` object
//! describing where and when it was produced, plus one map per entity kind.
//! Maps are ordered by key so the same remote state always serializes to the
//! same bytes (apart from `meta.exportDate`).

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SyncError, SyncResult};
use crate::files;
use crate::model::{IdpProvider, ScriptObject};

/// Name recorded as `meta.exportTool`.
pub const EXPORT_TOOL: &str = "idsync";

/// Export metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMeta {
    #[serde(default)]
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_am_version: Option<String>,
    #[serde(default)]
    pub exported_by: String,
    #[serde(default)]
    pub export_date: String,
    #[serde(default)]
    pub export_tool: String,
    #[serde(default)]
    pub export_tool_version: String,
}

/// A bundle of exported entities. `B` is the script body type: line arrays
/// for ordinary bundles, a source file name for extracted meta files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "B: serde::de::DeserializeOwned"))]
pub struct ExportBundle<B = Vec<String>> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ExportMeta>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub script: BTreeMap<String, ScriptObject<B>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub idp: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub idm: BTreeMap<String, Value>,
}

impl<B> Default for ExportBundle<B> {
    fn default() -> Self {
        Self {
            meta: None,
            script: BTreeMap::new(),
            idp: BTreeMap::new(),
            idm: BTreeMap::new(),
        }
    }
}

impl<B> ExportBundle<B> {
    /// An empty bundle carrying `meta`.
    pub fn with_meta(meta: ExportMeta) -> Self {
        Self {
            meta: Some(meta),
            ..Self::default()
        }
    }

    /// Add a script keyed by its id.
    pub fn insert_script(&mut self, script: ScriptObject<B>) {
        self.script.insert(script.id.clone(), script);
    }

    /// Add a provider keyed by its id.
    pub fn insert_provider(&mut self, provider: IdpProvider) {
        self.idp.insert(provider.id, provider.payload);
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty() && self.idp.is_empty() && self.idm.is_empty()
    }

    /// Check the bundle is importable: `meta` must be present.
    pub fn ensure_importable(&self) -> SyncResult<()> {
        if self.meta.is_none() {
            return Err(SyncError::InvalidBundle("missing top-level 'meta' object".to_string()));
        }
        Ok(())
    }

    /// Transform script ids referenced by providers that this bundle does
    /// not carry.
    pub fn missing_transform_scripts(&self) -> Vec<String> {
        self.idp
            .values()
            .filter_map(|p| p.get("transform").and_then(Value::as_str))
            .filter(|id| !id.is_empty() && !self.script.contains_key(*id))
            .map(str::to_string)
            .collect()
    }
}

impl<B: Serialize> ExportBundle<B> {
    /// Write the bundle as 2-space indented JSON.
    pub fn write(&self, path: &Path) -> SyncResult<()> {
        files::write_json(path, self)
    }
}

impl<B: serde::de::DeserializeOwned> ExportBundle<B> {
    /// Read a bundle from disk, requiring a `meta` object.
    pub fn read(path: &Path) -> SyncResult<Self> {
        let text = files::read_text(path)?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Parse bundle text, requiring a `meta` object.
    pub fn parse(text: &str, context: &str) -> SyncResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| SyncError::json(context, e))?;
        match value.get("meta") {
            Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(SyncError::InvalidBundle(format!(
                    "{context}: 'meta' is not an object"
                )))
            }
            None => {
                return Err(SyncError::InvalidBundle(format!(
                    "{context}: missing top-level 'meta' object"
                )))
            }
        }
        serde_json::from_value(value).map_err(|e| SyncError::json(context, e))
    }
}

/// Identifies the export source; builds `meta` for new bundles.
#[derive(Debug, Clone)]
pub struct BundleContext {
    pub realm: String,
    pub origin: String,
    pub exported_by: String,
    pub origin_am_version: Option<String>,
}

impl BundleContext {
    pub fn new(realm: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            origin: origin.into(),
            exported_by: String::new(),
            origin_am_version: None,
        }
    }

    pub fn exported_by(mut self, who: impl Into<String>) -> Self {
        self.exported_by = who.into();
        self
    }

    pub fn origin_am_version(mut self, version: impl Into<String>) -> Self {
        self.origin_am_version = Some(version.into());
        self
    }

    /// Fresh metadata stamped with the current time.
    pub fn meta(&self) -> ExportMeta {
        ExportMeta {
            origin: self.origin.clone(),
            origin_am_version: self.origin_am_version.clone(),
            exported_by: self.exported_by.clone(),
            export_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            export_tool: EXPORT_TOOL.to_string(),
            export_tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// An empty bundle carrying fresh metadata.
    pub fn bundle<B>(&self) -> ExportBundle<B> {
        ExportBundle::with_meta(self.meta())
    }
}
