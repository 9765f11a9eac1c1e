//! CLI command implementations

pub mod config;
pub mod idp;
pub mod logs;
pub mod org;
pub mod script;

use std::sync::Arc;

use idsync_core::batch::BatchResult;
use idsync_core::bundle::BundleContext;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::output;

/// State shared by every command
pub struct Context {
    pub config: Config,
    pub quiet: bool,
}

impl Context {
    pub fn new(config: Config, quiet: bool) -> Self {
        Self { config, quiet }
    }

    /// HTTP client for the configured tenant
    pub fn client(&self) -> CliResult<Arc<ApiClient>> {
        Ok(Arc::new(ApiClient::new(self.config.clone())?))
    }

    /// Bundle metadata source for exports from `client`
    pub fn bundle_context(&self, client: &ApiClient) -> BundleContext {
        BundleContext::new(self.config.realm.clone(), client.host()).exported_by(current_user())
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default()
}

/// Print `batch` unless quiet, then fail when any item failed
pub fn finish_batch(batch: &BatchResult, quiet: bool) -> CliResult<()> {
    if !quiet || batch.has_failures() {
        output::print_batch(batch);
    }
    batch_outcome(batch)
}

fn batch_outcome(batch: &BatchResult) -> CliResult<()> {
    if batch.has_failures() {
        return Err(CliError::BatchFailed {
            operation: batch.operation.clone(),
            failed: batch.failure_count,
            total: batch.total,
        });
    }
    Ok(())
}

/// Reject flag combinations that leave the operation ambiguous
pub(crate) fn require_one(choices: &[(&str, bool)]) -> CliResult<()> {
    let set: Vec<&str> = choices.iter().filter(|(_, on)| *on).map(|(n, _)| *n).collect();
    match set.len() {
        1 => Ok(()),
        0 => Err(CliError::Validation(format!(
            "one of {} is required",
            choices.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", ")
        ))),
        _ => Err(CliError::Validation(format!(
            "{} cannot be combined",
            set.join(" and ")
        ))),
    }
}
