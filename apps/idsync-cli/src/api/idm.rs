//! IDM configuration and managed objects

use async_trait::async_trait;
use idsync_core::error::SyncResult;
use idsync_core::pager::Page;
use idsync_core::remote::ConfigRemote;
use serde::Deserialize;
use serde_json::Value;

use super::ApiClient;

/// Page size requested for managed object queries.
const MANAGED_PAGE_SIZE: &str = "10000";

#[derive(Debug, Deserialize)]
struct ConfigList {
    #[serde(default)]
    configurations: Vec<ConfigRef>,
}

#[derive(Debug, Deserialize)]
struct ConfigRef {
    #[serde(rename = "_id")]
    id: String,
}

#[async_trait]
impl ConfigRemote for ApiClient {
    async fn list_config_entities(&self) -> SyncResult<Vec<String>> {
        let list: ConfigList = self.send_json(self.get(&self.idm_url("/config"))).await?;
        Ok(list.configurations.into_iter().map(|c| c.id).collect())
    }

    async fn get_config_entity(&self, id: &str) -> SyncResult<Value> {
        self.send_json(self.get(&self.idm_url(&format!("/config/{id}"))))
            .await
    }

    async fn put_config_entity(&self, id: &str, payload: &Value) -> SyncResult<()> {
        let request = self.put(&self.idm_url(&format!("/config/{id}"))).json(payload);
        self.send(request).await.map(|_| ())
    }

    async fn query_managed_objects(
        &self,
        object_type: &str,
        fields: &[String],
        cursor: Option<String>,
    ) -> SyncResult<Page<Value>> {
        let mut query = vec![
            ("_queryFilter", "true".to_string()),
            ("_pageSize", MANAGED_PAGE_SIZE.to_string()),
        ];
        if !fields.is_empty() {
            query.push(("_fields", fields.join(",")));
        }
        if let Some(cursor) = cursor {
            query.push(("_pagedResultsCookie", cursor));
        }
        let request = self
            .get(&self.idm_url(&format!("/managed/{object_type}")))
            .query(&query);
        self.send_json(request).await
    }
}
