//! Platform-specific configuration paths

use crate::error::{CliError, CliResult};
use std::path::PathBuf;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "IDSYNC_CONFIG_DIR";

/// Configuration paths for the idsync CLI
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Base configuration directory
    pub config_dir: PathBuf,
    /// Path to config.json
    pub config_file: PathBuf,
}

impl ConfigPaths {
    /// Get configuration paths for the current platform
    ///
    /// Paths:
    /// - Linux: ~/.config/idsync/
    /// - macOS: ~/Library/Application Support/idsync/
    /// - Windows: %APPDATA%\idsync\
    pub fn new() -> CliResult<Self> {
        Ok(Self::in_dir(Self::get_config_dir()?))
    }

    /// Paths rooted at an explicit directory
    pub fn in_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            config_file: config_dir.join("config.json"),
            config_dir,
        }
    }

    fn get_config_dir() -> CliResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let base_dir = dirs::config_dir().ok_or_else(|| {
            CliError::Config("Could not determine configuration directory".to_string())
        })?;

        Ok(base_dir.join("idsync"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_layout() {
        let paths = ConfigPaths::in_dir("/tmp/idsync-test");
        assert_eq!(paths.config_dir, PathBuf::from("/tmp/idsync-test"));
        assert_eq!(
            paths.config_file,
            PathBuf::from("/tmp/idsync-test/config.json")
        );
    }

    #[test]
    fn test_config_dir_override() {
        std::env::set_var(CONFIG_DIR_ENV, "/tmp/idsync-override");
        let paths = ConfigPaths::new().unwrap();
        assert_eq!(paths.config_dir, PathBuf::from("/tmp/idsync-override"));
        std::env::remove_var(CONFIG_DIR_ENV);
    }
}
