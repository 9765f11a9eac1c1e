//! Log stream endpoints

use async_trait::async_trait;
use idsync_core::error::SyncResult;
use idsync_core::logs::LogEntry;
use idsync_core::pager::Page;
use idsync_core::remote::LogRemote;

use super::ApiClient;

#[async_trait]
impl LogRemote for ApiClient {
    async fn list_sources(&self) -> SyncResult<Vec<String>> {
        let request = self.get_logs(&self.tenant_url("/monitoring/logs/sources"), false);
        let page: Page<String> = self.send_json(request).await?;
        Ok(page.items)
    }

    async fn tail(&self, source: &str, cursor: Option<String>) -> SyncResult<Page<LogEntry>> {
        let mut query = vec![("source", source.to_string())];
        if let Some(cursor) = cursor {
            query.push(("_pagedResultsCookie", cursor));
        }
        let request = self
            .get_logs(&self.tenant_url("/monitoring/logs/tail"), false)
            .query(&query);
        self.send_json(request).await
    }

    async fn fetch(
        &self,
        source: &str,
        begin: &str,
        end: &str,
        cursor: Option<String>,
    ) -> SyncResult<Page<LogEntry>> {
        let mut query = vec![
            ("source", source.to_string()),
            ("beginTime", begin.to_string()),
            ("endTime", end.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("_pagedResultsCookie", cursor));
        }
        let request = self
            .get_logs(&self.tenant_url("/monitoring/logs"), true)
            .query(&query);
        self.send_json(request).await
    }
}
