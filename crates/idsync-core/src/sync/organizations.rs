//! Organization listing.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::error::SyncResult;
use crate::pager;
use crate::remote::ConfigRemote;

/// Fields requested for each organization.
pub const ORGANIZATION_FIELDS: [&str; 3] = ["name", "parent/*/name", "children/*/name"];

/// Managed object type holding a realm's organizations.
///
/// Cloud tenants prefix the type with the realm name.
pub fn organization_type(realm: &str, cloud: bool) -> String {
    if cloud {
        format!("{realm}_organization")
    } else {
        "organization".to_string()
    }
}

/// Read access to organization managed objects.
pub struct OrganizationSync<R> {
    remote: Arc<R>,
    object_type: String,
}

impl<R: ConfigRemote> OrganizationSync<R> {
    pub fn new(remote: Arc<R>, object_type: impl Into<String>) -> Self {
        Self {
            remote,
            object_type: object_type.into(),
        }
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    /// Every organization, accumulated across all pages.
    pub async fn list_organizations(&self) -> SyncResult<Vec<Value>> {
        let fields: Vec<String> = ORGANIZATION_FIELDS.iter().map(|f| f.to_string()).collect();
        let fields = &fields;
        let organizations = pager::fetch_all(|cursor| {
            self.remote
                .query_managed_objects(&self.object_type, fields, cursor)
        })
        .await?;
        info!(
            object_type = %self.object_type,
            count = organizations.len(),
            "listed organizations"
        );
        Ok(organizations)
    }
}
