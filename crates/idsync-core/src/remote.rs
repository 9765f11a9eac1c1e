//! Remote management API seams.
//!
//! Each trait covers one remote capability. The HTTP implementation lives in
//! the CLI; tests use in-memory implementations. Implementations map a
//! uniqueness conflict to [`SyncError::Conflict`](crate::error::SyncError)
//! (or a 409 transport error) so the rename policy can see it.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SyncResult;
use crate::logs::LogEntry;
use crate::model::Script;
use crate::pager::Page;

/// IDM configuration and managed objects.
#[async_trait]
pub trait ConfigRemote: Send + Sync {
    /// Ids of every config entity.
    async fn list_config_entities(&self) -> SyncResult<Vec<String>>;

    /// Read one config entity.
    async fn get_config_entity(&self, id: &str) -> SyncResult<Value>;

    /// Create or replace a config entity.
    async fn put_config_entity(&self, id: &str, payload: &Value) -> SyncResult<()>;

    /// One page of managed objects of `object_type`, restricted to `fields`
    /// (all fields when empty).
    async fn query_managed_objects(
        &self,
        object_type: &str,
        fields: &[String],
        cursor: Option<String>,
    ) -> SyncResult<Page<Value>>;
}

/// Authentication scripts.
#[async_trait]
pub trait ScriptRemote: Send + Sync {
    /// Every script in the realm.
    async fn list_scripts(&self) -> SyncResult<Vec<Script>>;

    /// Scripts whose name equals `name`.
    async fn get_scripts_by_name(&self, name: &str) -> SyncResult<Vec<Script>>;

    /// Read one script.
    async fn get_script(&self, id: &str) -> SyncResult<Script>;

    /// Create or replace a script. A name already used by another script is
    /// a conflict.
    async fn put_script(&self, id: &str, script: &Script) -> SyncResult<()>;
}

/// Social identity providers.
#[async_trait]
pub trait IdpRemote: Send + Sync {
    /// Every provider in the realm.
    async fn list_providers(&self) -> SyncResult<Vec<Value>>;

    /// Create or replace a provider of type `type_id`.
    async fn put_provider(&self, type_id: &str, id: &str, payload: &Value) -> SyncResult<()>;
}

/// Platform log stream.
#[async_trait]
pub trait LogRemote: Send + Sync {
    /// Available log sources.
    async fn list_sources(&self) -> SyncResult<Vec<String>>;

    /// Latest entries for `source`, continuing from `cursor`.
    async fn tail(&self, source: &str, cursor: Option<String>) -> SyncResult<Page<LogEntry>>;

    /// Entries for `source` between `begin` and `end` (ISO 8601), one page at
    /// a time.
    async fn fetch(
        &self,
        source: &str,
        begin: &str,
        end: &str,
        cursor: Option<String>,
    ) -> SyncResult<Page<LogEntry>>;
}
