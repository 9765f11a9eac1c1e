//! HTTP client wrapper for the platform APIs

use crate::config::Config;
use crate::error::{CliError, CliResult};
use idsync_core::error::{SyncError, SyncResult};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::realm::{realm_path, tenant_url};

/// `Accept-API-Version` for script endpoints
pub const SCRIPT_API_VERSION: &str = "protocol=2.0,resource=1.0";

/// `Accept-API-Version` for social identity provider endpoints
pub const IDP_API_VERSION: &str = "protocol=2.1,resource=1.0";

const API_VERSION_HEADER: &str = "Accept-API-Version";
const LOG_API_KEY_HEADER: &str = "X-API-Key";
const LOG_API_SECRET_HEADER: &str = "X-API-Secret";

/// Bounded log fetches can be slow to assemble.
const LOG_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// API client for one tenant and realm
pub struct ApiClient {
    client: Client,
    config: Config,
    host: String,
    tenant: String,
}

impl ApiClient {
    /// Create a new API client; the config must name a host
    pub fn new(config: Config) -> CliResult<Self> {
        let host = config.host()?.to_string();
        let tenant = tenant_url(&host)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CliError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            host,
            tenant,
        })
    }

    /// Get a reference to the config
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// `<host>/json<realm path><path>`
    pub(crate) fn am_url(&self, path: &str) -> String {
        format!("{}/json{}{}", self.host, realm_path(&self.config.realm), path)
    }

    /// `<tenant>/openidm<path>`
    pub(crate) fn idm_url(&self, path: &str) -> String {
        format!("{}/openidm{}", self.tenant, path)
    }

    /// `<tenant><path>`
    pub(crate) fn tenant_url(&self, path: &str) -> String {
        format!("{}{}", self.tenant, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.get(url))
    }

    pub(crate) fn put(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.put(url))
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.post(url))
    }

    /// GET against the log API, authenticated with the log API key pair
    pub(crate) fn get_logs(&self, url: &str, fetch: bool) -> RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(key) = &self.config.log_api_key {
            request = request.header(LOG_API_KEY_HEADER, key);
        }
        if let Some(secret) = &self.config.log_api_secret {
            request = request.header(LOG_API_SECRET_HEADER, secret);
        }
        if fetch {
            request = request.timeout(LOG_FETCH_TIMEOUT);
        }
        request
    }

    /// Send `request` and fail on any non-success status
    pub(crate) async fn send(&self, request: RequestBuilder) -> SyncResult<Response> {
        let response = request.send().await.map_err(transport_error)?;
        debug!(status = %response.status(), url = %response.url(), "response");
        check_status(response).await
    }

    /// Send `request` and decode the JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> SyncResult<T> {
        let response = self.send(request).await?;
        let url = response.url().to_string();
        let body = response.text().await.map_err(transport_error)?;
        serde_json::from_str(&body).map_err(|e| SyncError::json(url, e))
    }
}

pub(crate) fn with_api_version(request: RequestBuilder, version: &str) -> RequestBuilder {
    request.header(API_VERSION_HEADER, version)
}

fn transport_error(e: reqwest::Error) -> SyncError {
    if e.is_timeout() {
        SyncError::Connection("request timed out".to_string())
    } else {
        SyncError::Connection(e.to_string())
    }
}

/// Map a non-success response to the core error taxonomy.
///
/// The platform reports errors as `{"code": .., "message": ..}`; the
/// message is kept so tolerated quirks can be recognized by text.
pub async fn check_status(response: Response) -> SyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    Err(match status.as_u16() {
        404 => SyncError::NotFound { what: message },
        409 => SyncError::Conflict { message },
        code => SyncError::Transport {
            status: code,
            message,
        },
    })
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
