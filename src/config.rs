//! Configuration for the memory bank server
//!
//! Layered with the `config` crate, lowest priority first:
//! 1. Built-in defaults
//! 2. `<config_dir>/memory-bank/config.toml` (optional)
//! 3. `MEMORY_BANK_*` environment variables
//! 4. CLI flags, applied by the binary through the `with_*` setters

use crate::error::{MemoryBankError, Result};
use crate::session::DEFAULT_AUTO_SAVE_THRESHOLD;
use crate::settings::SettingsRegistry;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name the server registers itself under in client settings
pub const DEFAULT_SERVER_NAME: &str = "memory-bank";

const ENV_PREFIX: &str = "MEMORY_BANK";

/// Runtime configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BankConfig {
    /// Project whose memory bank resources are served when a request does
    /// not name one
    #[serde(default)]
    pub project_path: Option<PathBuf>,

    /// MCP client settings file updated on initialization
    #[serde(default)]
    pub settings_path: Option<PathBuf>,

    #[serde(default = "default_threshold")]
    pub auto_save_threshold: usize,

    #[serde(default = "default_server_name")]
    pub server_name: String,
}

fn default_threshold() -> usize {
    DEFAULT_AUTO_SAVE_THRESHOLD
}

fn default_server_name() -> String {
    DEFAULT_SERVER_NAME.to_string()
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            project_path: None,
            settings_path: None,
            auto_save_threshold: DEFAULT_AUTO_SAVE_THRESHOLD,
            server_name: default_server_name(),
        }
    }
}

/// Default location of the optional config file
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("memory-bank").join("config.toml"))
}

impl BankConfig {
    /// Load from an optional config file and the environment
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("auto_save_threshold", DEFAULT_AUTO_SAVE_THRESHOLD as i64)?
            .set_default("server_name", DEFAULT_SERVER_NAME)?;

        if let Some(file) = file {
            debug!("Reading configuration from {}", file.display());
            builder = builder.add_source(config::File::from(file.to_path_buf()).required(false));
        }

        let loaded: BankConfig = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(loaded.normalized())
    }

    pub fn with_project_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.project_path = path;
        }
        self
    }

    pub fn with_settings_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.settings_path = path;
        }
        self
    }

    /// The configured project path, or `ConfigurationMissing`
    pub fn require_project_path(&self) -> Result<&Path> {
        self.project_path.as_deref().ok_or_else(|| {
            MemoryBankError::ConfigurationMissing(format!(
                "no project path configured (set {}_PROJECT_PATH or pass --project-path)",
                ENV_PREFIX
            ))
        })
    }

    /// Settings registry for the configured settings file, if any
    pub fn settings_registry(&self, command: impl Into<String>) -> Option<SettingsRegistry> {
        self.settings_path
            .clone()
            .map(|path| SettingsRegistry::new(path, self.server_name.clone(), command))
    }

    /// Empty strings from the environment mean "unset"
    fn normalized(mut self) -> Self {
        let empty = |p: &Option<PathBuf>| p.as_ref().is_some_and(|p| p.as_os_str().is_empty());
        if empty(&self.project_path) {
            self.project_path = None;
        }
        if empty(&self.settings_path) {
            self.settings_path = None;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    const VARS: [&str; 4] = [
        "MEMORY_BANK_PROJECT_PATH",
        "MEMORY_BANK_SETTINGS_PATH",
        "MEMORY_BANK_AUTO_SAVE_THRESHOLD",
        "MEMORY_BANK_SERVER_NAME",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = BankConfig::load_from(None).unwrap();
        assert!(config.project_path.is_none());
        assert!(config.settings_path.is_none());
        assert_eq!(config.auto_save_threshold, DEFAULT_AUTO_SAVE_THRESHOLD);
        assert_eq!(config.server_name, DEFAULT_SERVER_NAME);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("config.toml");
        std::fs::write(
            &file,
            "project_path = \"/from/file\"\nauto_save_threshold = 4\nserver_name = \"bank\"\n",
        )
        .unwrap();

        let config = BankConfig::load_from(Some(&file)).unwrap();
        assert_eq!(config.project_path, Some(PathBuf::from("/from/file")));
        assert_eq!(config.auto_save_threshold, 4);
        assert_eq!(config.server_name, "bank");

        env::set_var("MEMORY_BANK_PROJECT_PATH", "/from/env");
        env::set_var("MEMORY_BANK_AUTO_SAVE_THRESHOLD", "7");
        let config = BankConfig::load_from(Some(&file)).unwrap();
        clear_env();

        assert_eq!(config.project_path, Some(PathBuf::from("/from/env")));
        assert_eq!(config.auto_save_threshold, 7);
    }

    #[test]
    #[serial]
    fn test_missing_file_is_ignored() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let config = BankConfig::load_from(Some(&temp.path().join("absent.toml"))).unwrap();
        assert_eq!(config.server_name, DEFAULT_SERVER_NAME);
    }

    #[test]
    fn test_cli_overrides_and_require() {
        let config = BankConfig::default();
        assert!(matches!(
            config.require_project_path(),
            Err(MemoryBankError::ConfigurationMissing(_))
        ));

        let config = config
            .with_project_path(Some(PathBuf::from("/cli")))
            .with_settings_path(None);
        assert_eq!(config.require_project_path().unwrap(), Path::new("/cli"));
        assert!(config.settings_registry("memory-bank").is_none());

        let config = config.with_settings_path(Some(PathBuf::from("/tmp/settings.json")));
        let registry = config.settings_registry("memory-bank").unwrap();
        assert_eq!(registry.path(), Path::new("/tmp/settings.json"));
    }
}
