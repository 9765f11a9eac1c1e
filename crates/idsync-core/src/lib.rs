//! # idsync core
//!
//! Export/import synchronization pipeline for identity platform configuration.
//!
//! This crate moves configuration objects (IDM config entities, authentication
//! scripts, social identity providers) between a remote management API and a
//! local file tree, and tails/fetches the platform's log stream.
//!
//! ## Architecture
//!
//! - [`model`] - Remote object shapes (scripts, providers, config entities)
//! - [`pager`] - Walks cursor-paginated remote collections to completion
//! - [`transform`] - Script body codec and environment parameterization
//! - [`files`] - Deterministic file naming and directory traversal
//! - [`bundle`] - The on-disk export unit (`meta` plus entity sections)
//! - [`collision`] - Rename-on-conflict policy for named resources
//! - [`validation`] - Script-hook discovery and syntax gate
//! - [`sync`] - Export/import orchestration per entity kind
//! - [`logs`] - Log filtering plus the tail and bounded fetch loops
//!
//! Remote access goes through the traits in [`remote`]; the HTTP
//! implementation lives in the CLI application.
//!
//! ## Example
//!
//! ```ignore
//! use idsync_core::prelude::*;
//!
//! let sync = ConfigSync::new(remote, BundleContext::new("alpha", "https://tenant"));
//! let report = sync.export_all_raw(Path::new("./idm")).await?;
//! report.log_summary();
//! ```

pub mod batch;
pub mod bundle;
pub mod collision;
pub mod error;
pub mod files;
pub mod logs;
pub mod model;
pub mod pager;
pub mod remote;
pub mod sync;
pub mod transform;
pub mod validation;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::batch::{BatchItemResult, BatchItemStatus, BatchResult};
    pub use crate::bundle::{BundleContext, ExportBundle, ExportMeta};
    pub use crate::error::{SyncError, SyncResult};
    pub use crate::logs::{LevelTable, LogEntry, LogFilter, LogSink, NoiseFilter};
    pub use crate::model::{ConfigEntity, IdpProvider, SavedScript, Script, ScriptLanguage, ScriptObject};
    pub use crate::pager::{fetch_all, paginate, Page};
    pub use crate::remote::{ConfigRemote, IdpRemote, LogRemote, ScriptRemote};
    pub use crate::sync::config::{ConfigSync, EntitySelection};
    pub use crate::sync::idp::IdpSync;
    pub use crate::sync::organizations::{organization_type, OrganizationSync};
    pub use crate::sync::FileExport;
    pub use crate::sync::scripts::{ScriptImportOptions, ScriptSync};
    pub use crate::transform::env::EnvironmentMap;
    pub use crate::validation::{JavaScriptChecker, SyntaxChecker};
}

// Re-export async_trait for remote implementors
pub use async_trait::async_trait;
