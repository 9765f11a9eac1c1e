//! Social identity provider endpoints

use async_trait::async_trait;
use idsync_core::error::SyncResult;
use idsync_core::pager::Page;
use idsync_core::remote::IdpRemote;
use serde_json::{json, Value};

use super::client::with_api_version;
use super::{ApiClient, IDP_API_VERSION};

const PROVIDERS_PATH: &str = "/realm-config/services/SocialIdentityProviders";

#[async_trait]
impl IdpRemote for ApiClient {
    async fn list_providers(&self) -> SyncResult<Vec<Value>> {
        let request = with_api_version(self.post(&self.am_url(PROVIDERS_PATH)), IDP_API_VERSION)
            .query(&[("_action", "nextdescendents")])
            .json(&json!({}));
        let page: Page<Value> = self.send_json(request).await?;
        Ok(page.items)
    }

    async fn put_provider(&self, type_id: &str, id: &str, payload: &Value) -> SyncResult<()> {
        let url = self.am_url(&format!("{PROVIDERS_PATH}/{type_id}/{id}"));
        let request = with_api_version(self.put(&url), IDP_API_VERSION).json(payload);
        self.send(request).await.map(|_| ())
    }
}
