//! Common test utilities for idsync-core integration tests.
//!
//! Provides an in-memory remote implementing every remote trait, plus
//! fixtures for scripts, providers and log entries.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use idsync_core::async_trait;
use idsync_core::prelude::*;
use idsync_core::transform::encode_text;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const REALM: &str = "alpha";
pub const ORIGIN: &str = "https://tenant.example.com/am";

pub fn context() -> BundleContext {
    BundleContext::new(REALM, ORIGIN)
}

/// A JavaScript script with the given source.
pub fn js_script(id: &str, name: &str, source: &str) -> Script {
    serde_json::from_value(json!({
        "_id": id,
        "name": name,
        "description": "test script",
        "script": encode_text(source),
        "default": false,
        "language": "JAVASCRIPT",
        "context": "AUTHENTICATION_TREE_DECISION_NODE"
    }))
    .unwrap()
}

pub fn groovy_script(id: &str, name: &str, source: &str) -> Script {
    serde_json::from_value(json!({
        "_id": id,
        "name": name,
        "script": encode_text(source),
        "language": "GROOVY",
        "context": "SOCIAL_IDP_PROFILE_TRANSFORMATION"
    }))
    .unwrap()
}

pub fn provider(id: &str, type_id: &str, transform: Option<&str>) -> Value {
    let mut value = json!({
        "_id": id,
        "_type": {"_id": type_id, "name": type_id, "collection": true},
        "enabled": true,
        "clientId": format!("{id}-client"),
    });
    if let Some(transform) = transform {
        value["transform"] = json!(transform);
    }
    value
}

pub fn am_entry(level: &str, logger: &str, txid: &str, message: &str) -> LogEntry {
    LogEntry::structured(
        "application/json",
        json!({
            "level": level,
            "logger": logger,
            "transactionId": txid,
            "message": message,
        }),
    )
}

// ---------------------------------------------------------------------------
// MemoryRemote
// ---------------------------------------------------------------------------

/// Writes seen by the remote, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Config(String),
    Script(String, String),
    Provider(String, String),
}

#[derive(Default)]
struct State {
    config: BTreeMap<String, Value>,
    scripts: BTreeMap<String, Script>,
    providers: BTreeMap<String, Value>,
    managed: HashMap<String, Vec<Page<Value>>>,
    tail_pages: VecDeque<Page<LogEntry>>,
    fetch_pages: Vec<Page<LogEntry>>,
    failing_reads: HashMap<String, SyncError>,
    writes: Vec<Write>,
    cursors: Vec<Option<String>>,
    queried_fields: Vec<Vec<String>>,
}

/// In-memory remote. Script names are unique: writing a script whose name
/// another id already uses is a conflict.
#[derive(Default)]
pub struct MemoryRemote {
    state: Mutex<State>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(self, id: &str, payload: Value) -> Self {
        self.state.lock().unwrap().config.insert(id.to_string(), payload);
        self
    }

    pub fn with_script(self, script: Script) -> Self {
        self.state
            .lock()
            .unwrap()
            .scripts
            .insert(script.id.clone(), script);
        self
    }

    pub fn with_provider(self, payload: Value) -> Self {
        let id = payload["_id"].as_str().unwrap().to_string();
        self.state.lock().unwrap().providers.insert(id, payload);
        self
    }

    pub fn with_managed_pages(self, object_type: &str, pages: Vec<Page<Value>>) -> Self {
        self.state
            .lock()
            .unwrap()
            .managed
            .insert(object_type.to_string(), pages);
        self
    }

    pub fn with_tail_pages(self, pages: Vec<Page<LogEntry>>) -> Self {
        self.state.lock().unwrap().tail_pages = pages.into();
        self
    }

    pub fn with_fetch_pages(self, pages: Vec<Page<LogEntry>>) -> Self {
        self.state.lock().unwrap().fetch_pages = pages;
        self
    }

    /// Make reads of config entity `id` fail with `error`.
    pub fn with_failing_read(self, id: &str, error: SyncError) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_reads
            .insert(id.to_string(), error);
        self
    }

    pub fn remove_config(&self, id: &str) {
        self.state.lock().unwrap().config.remove(id);
    }

    pub fn config(&self, id: &str) -> Option<Value> {
        self.state.lock().unwrap().config.get(id).cloned()
    }

    pub fn script(&self, id: &str) -> Option<Script> {
        self.state.lock().unwrap().scripts.get(id).cloned()
    }

    pub fn scripts(&self) -> Vec<Script> {
        self.state.lock().unwrap().scripts.values().cloned().collect()
    }

    pub fn writes(&self) -> Vec<Write> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.lock().unwrap().writes.clear();
    }

    pub fn cursors(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().cursors.clone()
    }

    pub fn queried_fields(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().queried_fields.clone()
    }
}

fn copy_error(error: &SyncError) -> SyncError {
    match error {
        SyncError::Transport { status, message } => SyncError::Transport {
            status: *status,
            message: message.clone(),
        },
        other => SyncError::Connection(other.to_string()),
    }
}

fn page_at<T: Clone>(pages: &[Page<T>], cursor: &Option<String>) -> Page<T> {
    let index = cursor
        .as_deref()
        .map(|c| c.parse::<usize>().unwrap())
        .unwrap_or(0);
    pages
        .get(index)
        .cloned()
        .unwrap_or_else(|| Page::last(Vec::new()))
}

#[async_trait]
impl ConfigRemote for MemoryRemote {
    async fn list_config_entities(&self) -> SyncResult<Vec<String>> {
        let state = self.state.lock().unwrap();
        let mut ids: Vec<String> = state.config.keys().cloned().collect();
        ids.extend(state.failing_reads.keys().cloned());
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn get_config_entity(&self, id: &str) -> SyncResult<Value> {
        let state = self.state.lock().unwrap();
        if let Some(error) = state.failing_reads.get(id) {
            return Err(copy_error(error));
        }
        state
            .config
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::not_found(format!("config '{id}'")))
    }

    async fn put_config_entity(&self, id: &str, payload: &Value) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.config.insert(id.to_string(), payload.clone());
        state.writes.push(Write::Config(id.to_string()));
        Ok(())
    }

    async fn query_managed_objects(
        &self,
        object_type: &str,
        fields: &[String],
        cursor: Option<String>,
    ) -> SyncResult<Page<Value>> {
        let mut state = self.state.lock().unwrap();
        state.cursors.push(cursor.clone());
        state.queried_fields.push(fields.to_vec());
        let pages = state
            .managed
            .get(object_type)
            .ok_or_else(|| SyncError::not_found(format!("managed/{object_type}")))?;
        Ok(page_at(pages, &cursor))
    }
}

#[async_trait]
impl ScriptRemote for MemoryRemote {
    async fn list_scripts(&self) -> SyncResult<Vec<Script>> {
        Ok(self.scripts())
    }

    async fn get_scripts_by_name(&self, name: &str) -> SyncResult<Vec<Script>> {
        Ok(self.scripts().into_iter().filter(|s| s.name == name).collect())
    }

    async fn get_script(&self, id: &str) -> SyncResult<Script> {
        self.script(id)
            .ok_or_else(|| SyncError::not_found(format!("script '{id}'")))
    }

    async fn put_script(&self, id: &str, script: &Script) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        let taken = state
            .scripts
            .values()
            .any(|s| s.name == script.name && s.id != id);
        if taken {
            return Err(SyncError::Conflict {
                message: format!("script name '{}' already in use", script.name),
            });
        }
        let mut stored = script.clone();
        stored.id = id.to_string();
        state.scripts.insert(id.to_string(), stored);
        state
            .writes
            .push(Write::Script(id.to_string(), script.name.clone()));
        Ok(())
    }
}

#[async_trait]
impl IdpRemote for MemoryRemote {
    async fn list_providers(&self) -> SyncResult<Vec<Value>> {
        Ok(self.state.lock().unwrap().providers.values().cloned().collect())
    }

    async fn put_provider(&self, type_id: &str, id: &str, payload: &Value) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.providers.insert(id.to_string(), payload.clone());
        state
            .writes
            .push(Write::Provider(type_id.to_string(), id.to_string()));
        Ok(())
    }
}

#[async_trait]
impl LogRemote for MemoryRemote {
    async fn list_sources(&self) -> SyncResult<Vec<String>> {
        Ok(vec!["am-core".to_string(), "idm-core".to_string()])
    }

    async fn tail(&self, _source: &str, cursor: Option<String>) -> SyncResult<Page<LogEntry>> {
        let mut state = self.state.lock().unwrap();
        state.cursors.push(cursor);
        Ok(state
            .tail_pages
            .pop_front()
            .unwrap_or_else(|| Page::last(Vec::new())))
    }

    async fn fetch(
        &self,
        _source: &str,
        _begin: &str,
        _end: &str,
        cursor: Option<String>,
    ) -> SyncResult<Page<LogEntry>> {
        let mut state = self.state.lock().unwrap();
        state.cursors.push(cursor.clone());
        Ok(page_at(&state.fetch_pages, &cursor))
    }
}
