//! Tenant connection settings

use super::ConfigPaths;
use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};

/// Kind of platform deployment the tenant runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    #[default]
    Cloud,
    Forgeops,
    Classic,
}

impl Deployment {
    pub fn is_cloud(self) -> bool {
        self == Deployment::Cloud
    }
}

fn default_realm() -> String {
    "alpha".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// CLI configuration, read from `config.json` and the environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Platform base URL, e.g. `https://tenant.example.com/am`
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_realm")]
    pub realm: String,

    #[serde(default)]
    pub deployment: Deployment,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_api_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: None,
            realm: default_realm(),
            deployment: Deployment::default(),
            timeout_secs: default_timeout(),
            log_api_key: None,
            log_api_secret: None,
            access_token: None,
        }
    }
}

impl Config {
    /// Load `config.json` (defaults when missing), then apply `IDSYNC_*`
    /// environment overrides.
    pub fn load(paths: &ConfigPaths) -> CliResult<Self> {
        let mut config = if paths.config_file.exists() {
            let text = std::fs::read_to_string(&paths.config_file)?;
            serde_json::from_str(&text).map_err(|e| {
                CliError::Config(format!("{}: {e}", paths.config_file.display()))
            })?
        } else {
            Config::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from `lookup`; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(host) = get("IDSYNC_HOST") {
            self.host = Some(host);
        }
        if let Some(realm) = get("IDSYNC_REALM") {
            self.realm = realm;
        }
        if let Some(token) = get("IDSYNC_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        if let Some(key) = get("IDSYNC_LOG_API_KEY") {
            self.log_api_key = Some(key);
        }
        if let Some(secret) = get("IDSYNC_LOG_API_SECRET") {
            self.log_api_secret = Some(secret);
        }
    }

    /// The configured host, required for any remote call
    pub fn host(&self) -> CliResult<&str> {
        self.host
            .as_deref()
            .map(|h| h.trim_end_matches('/'))
            .filter(|h| !h.is_empty())
            .ok_or(CliError::NoHost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.realm, "alpha");
        assert_eq!(config.deployment, Deployment::Cloud);
        assert_eq!(config.timeout_secs, 30);
        assert!(matches!(config.host(), Err(CliError::NoHost)));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"host": "https://t.example.com/am/", "deployment": "classic"}"#)
                .unwrap();
        assert_eq!(config.host().unwrap(), "https://t.example.com/am");
        assert_eq!(config.realm, "alpha");
        assert!(!config.deployment.is_cloud());
    }

    #[test]
    fn test_env_overrides_ignore_empty_values() {
        let env: HashMap<&str, &str> = [
            ("IDSYNC_REALM", "bravo"),
            ("IDSYNC_HOST", ""),
            ("IDSYNC_ACCESS_TOKEN", "tok"),
        ]
        .into_iter()
        .collect();
        let mut config = Config {
            host: Some("https://keep.example.com".to_string()),
            ..Config::default()
        };
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.realm, "bravo");
        assert_eq!(config.host.as_deref(), Some("https://keep.example.com"));
        assert_eq!(config.access_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::in_dir(dir.path());
        let config = Config::load(&paths).unwrap();
        assert_eq!(config.timeout_secs, 30);
    }
}
