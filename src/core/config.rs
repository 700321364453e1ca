use crate::providers::util::RetryPolicy;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SourcesConfig {
    pub primary: SourceConfig,
    pub secondary: SourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            primary: SourceConfig {
                name: "source-1".to_string(),
                base_url: "http://localhost:8888".to_string(),
            },
            secondary: SourceConfig {
                name: "source-2".to_string(),
                base_url: "http://localhost:8889".to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PingConfig {
    pub base_url: String,
}

impl Default for PingConfig {
    fn default() -> Self {
        PingConfig {
            base_url: "http://localhost:8889".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub sources: SourcesConfig,
    pub ping: PingConfig,
    pub retry: RetryPolicy,
    /// Per-request timeout for upstream calls. Unset means requests may
    /// block indefinitely.
    pub request_timeout_ms: Option<u64>,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Loads the config at the default location, or the built-in defaults
    /// when no file exists there yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "txagg", "txagg")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
sources:
  primary:
    name: "ledger-a"
    base_url: "http://example.com/a"
  secondary:
    name: "ledger-b"
    base_url: "http://example.com/b"
ping:
  base_url: "http://example.com/b"
retry:
  max_attempts: 3
  delay_ms: 250
request_timeout_ms: 1500
server:
  bind: "0.0.0.0:9000"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.sources.primary.name, "ledger-a");
        assert_eq!(config.sources.primary.base_url, "http://example.com/a");
        assert_eq!(config.sources.secondary.name, "ledger-b");
        assert_eq!(config.ping.base_url, "http://example.com/b");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 250);
        assert_eq!(config.request_timeout_ms, Some(1500));
        assert_eq!(config.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let yaml_str = r#"
sources:
  secondary:
    name: "only-b"
    base_url: "http://example.com/b"
retry:
  delay_ms: 10
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.sources.primary.base_url, "http://localhost:8888");
        assert_eq!(config.sources.secondary.name, "only-b");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay_ms, 10);
        assert!(config.request_timeout_ms.is_none());
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = AppConfig::load_from_path(dir.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
