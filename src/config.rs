use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{FlowsyncError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5678";
pub const DEFAULT_API_KEY_HEADER: &str = "X-N8N-API-KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// remote api config
    pub api: ApiConfig,
    /// local sync directory config
    pub sync: SyncConfig,
    /// workflow tester config
    pub tester: TesterConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// service base url, without the `/api/v1` root
    pub base_url: String,
    /// api key, required to build a client
    pub api_key: Option<String>,
    /// header carrying the api key
    pub api_key_header: String,
    /// per-request timeout in milliseconds
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// directory holding one json file per workflow
    pub dir: PathBuf,
    /// glob matched against file names by `push_all`
    pub pattern: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TesterConfig {
    /// wait between execute and the status check, in milliseconds
    pub poll_delay_ms: u64,
    /// number of recent executions shown with workflow details
    pub executions_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("workflows"),
            pattern: "*.json".to_string(),
        }
    }
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            poll_delay_ms: 2_000,
            executions_limit: 5,
        }
    }
}

impl TesterConfig {
    pub fn poll_delay(&self) -> Duration {
        Duration::from_millis(self.poll_delay_ms)
    }
}

impl Config {
    pub fn load<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|err| FlowsyncError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), err)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<Config>(toml_str).map_err(|err| FlowsyncError::Config(format!("failed to parse the toml str: {}", err)))
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use crate::{Config, FlowsyncError};

    #[test]
    fn test_config_deserialize() {
        let toml_str = r#"
        [api]
        base_url = "http://n8n.internal:5678/"
        api_key = "secret"
        timeout_ms = 5000

        [sync]
        dir = "exported"

        [tester]
        poll_delay_ms = 0
        "#;
        let config = Config::load_from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "http://n8n.internal:5678/");
        assert_eq!(config.api.api_key.as_deref(), Some("secret"));
        assert_eq!(config.api.api_key_header, "X-N8N-API-KEY");
        assert_eq!(config.api.timeout().as_millis(), 5000);
        assert_eq!(config.sync.dir, PathBuf::from("exported"));
        assert_eq!(config.sync.pattern, "*.json");
        assert_eq!(config.tester.poll_delay_ms, 0);
        assert_eq!(config.tester.executions_limit, 5);
    }

    #[test]
    fn test_config_empty_uses_defaults() {
        let config = Config::load_from_str("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5678");
        assert!(config.api.api_key.is_none());
        assert_eq!(config.api.timeout_ms, 30_000);
        assert_eq!(config.sync.dir, PathBuf::from("workflows"));
    }

    #[test]
    fn test_config_invalid_toml() {
        let err = Config::load_from_str("[api\nbase_url = 1").unwrap_err();
        assert!(matches!(err, FlowsyncError::Config(_)));
    }

    #[test]
    fn test_config_missing_file() {
        let err = Config::load("/definitely/not/here/flowsync.toml").unwrap_err();
        assert!(matches!(err, FlowsyncError::Config(ref msg) if msg.contains("failed to load config file")));
    }
}
