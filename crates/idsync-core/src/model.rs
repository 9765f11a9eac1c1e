//! Remote object models.
//!
//! Config entities and identity providers are arbitrary JSON documents keyed
//! by `_id`; scripts have a fixed shape whose body is generic so the same
//! type covers the base64 wire form, the line-array file form and the
//! extracted form (body replaced by the source file name).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{SyncError, SyncResult};
use crate::transform::script_codec;

// ============================================================================
// Config entities
// ============================================================================

/// An IDM configuration object.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntity {
    pub id: String,
    pub payload: Value,
}

impl ConfigEntity {
    /// Wrap a remote document, reading its `_id`.
    pub fn from_value(payload: Value) -> SyncResult<Self> {
        let id = string_field(&payload, "_id")
            .ok_or_else(|| SyncError::Validation("config entity has no _id".to_string()))?
            .to_string();
        Ok(Self { id, payload })
    }
}

// ============================================================================
// Scripts
// ============================================================================

/// Scripting language of a script object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScriptLanguage {
    Javascript,
    Groovy,
}

impl ScriptLanguage {
    /// File extension used for extracted source files.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Javascript => "js",
            Self::Groovy => "groovy",
        }
    }

    /// Short label for listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Javascript => "JS",
            Self::Groovy => "Groovy",
        }
    }
}

/// A script object with body type `B`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptObject<B> {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub script: B,
    #[serde(default)]
    pub default: bool,
    pub language: ScriptLanguage,
    /// Script context such as `AUTHENTICATION_TREE_DECISION_NODE`; some
    /// tenants send `null`.
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<i64>,
    /// Fields this tool does not interpret, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Script as stored remotely: base64 body.
pub type Script = ScriptObject<String>;

/// Script as saved in a bundle: one string per source line.
pub type SavedScript = ScriptObject<Vec<String>>;

impl<B> ScriptObject<B> {
    /// Replace the body, keeping every other field.
    pub fn with_body<C>(self, script: C) -> ScriptObject<C> {
        ScriptObject {
            id: self.id,
            name: self.name,
            description: self.description,
            script,
            default: self.default,
            language: self.language,
            context: self.context,
            created_by: self.created_by,
            creation_date: self.creation_date,
            last_modified_by: self.last_modified_by,
            last_modified_date: self.last_modified_date,
            extra: self.extra,
        }
    }
}

impl Script {
    /// Convert to the line-array form.
    pub fn into_saved(self) -> SyncResult<SavedScript> {
        let lines = script_codec::decode_to_lines(&self.script)?;
        Ok(self.with_body(lines))
    }

    /// Decoded source text.
    pub fn source(&self) -> SyncResult<String> {
        script_codec::decode_text(&self.script)
    }
}

impl SavedScript {
    /// Convert back to the base64 wire form.
    pub fn into_wire(self) -> Script {
        let encoded = script_codec::encode_lines(&self.script);
        self.with_body(encoded)
    }
}

// ============================================================================
// Identity providers
// ============================================================================

/// A social identity provider.
///
/// `transform` is a weak reference to a script by id; nothing cascades when
/// that script changes.
#[derive(Debug, Clone, PartialEq)]
pub struct IdpProvider {
    pub id: String,
    pub type_id: String,
    pub transform: Option<String>,
    pub payload: Value,
}

impl IdpProvider {
    /// Wrap a remote provider document.
    pub fn from_value(payload: Value) -> SyncResult<Self> {
        let id = string_field(&payload, "_id")
            .ok_or_else(|| SyncError::Validation("provider has no _id".to_string()))?
            .to_string();
        let type_id = payload
            .get("_type")
            .and_then(|t| t.get("_id"))
            .and_then(Value::as_str)
            .ok_or_else(|| SyncError::Validation(format!("provider '{id}' has no _type._id")))?
            .to_string();
        let transform = string_field(&payload, "transform")
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Ok(Self {
            id,
            type_id,
            transform,
            payload,
        })
    }
}

fn string_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}
