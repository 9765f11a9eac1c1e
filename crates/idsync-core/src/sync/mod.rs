//! Export and import orchestration, one module per entity kind.
//!
//! Bulk operations never stop at the first failing item: every per-item
//! operation runs to completion and the outcome is returned as a
//! [`BatchResult`]. Errors that make the whole operation meaningless (an
//! unreadable bundle, a failed remote listing, a failed validation gate)
//! are returned as `Err` before anything is written.

pub mod config;
pub mod idp;
pub mod organizations;
pub mod scripts;

use std::path::PathBuf;

use crate::batch::BatchResult;

/// Result of an export that produced a single file.
#[derive(Debug, Clone)]
pub struct FileExport {
    pub path: PathBuf,
    pub batch: BatchResult,
}
