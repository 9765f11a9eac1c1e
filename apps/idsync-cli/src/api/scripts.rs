//! Script endpoints

use async_trait::async_trait;
use idsync_core::error::SyncResult;
use idsync_core::model::Script;
use idsync_core::pager::Page;
use idsync_core::remote::ScriptRemote;

use super::client::with_api_version;
use super::{ApiClient, SCRIPT_API_VERSION};

impl ApiClient {
    async fn query_scripts(&self, filter: &str) -> SyncResult<Vec<Script>> {
        let request = with_api_version(self.get(&self.am_url("/scripts")), SCRIPT_API_VERSION)
            .query(&[("_queryFilter", filter)]);
        let page: Page<Script> = self.send_json(request).await?;
        Ok(page.items)
    }
}

#[async_trait]
impl ScriptRemote for ApiClient {
    async fn list_scripts(&self) -> SyncResult<Vec<Script>> {
        self.query_scripts("true").await
    }

    async fn get_scripts_by_name(&self, name: &str) -> SyncResult<Vec<Script>> {
        self.query_scripts(&format!("name eq \"{name}\"")).await
    }

    async fn get_script(&self, id: &str) -> SyncResult<Script> {
        let request = with_api_version(
            self.get(&self.am_url(&format!("/scripts/{id}"))),
            SCRIPT_API_VERSION,
        );
        self.send_json(request).await
    }

    async fn put_script(&self, id: &str, script: &Script) -> SyncResult<()> {
        let request = with_api_version(
            self.put(&self.am_url(&format!("/scripts/{id}"))),
            SCRIPT_API_VERSION,
        )
        .json(script);
        self.send(request).await.map(|_| ())
    }
}
