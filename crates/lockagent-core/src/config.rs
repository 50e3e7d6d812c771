use crate::error::{LockError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Everything a [`crate::client::LockClient`] needs to reach the lock service.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the lock resource. Query parameters are merged onto it.
    pub endpoint: String,
    /// Upper bound for one request, connect through last body byte.
    pub timeout: Duration,
    /// Responses larger than this are rejected instead of buffered.
    pub max_response_bytes: usize,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }
}

// ---------------------------------------------------------------------------
// AgentConfig
// ---------------------------------------------------------------------------

/// Settings of the long-running agent, usually read from a YAML file and then
/// overridden by command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_endpoint: None,
            interval_secs: default_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_response_bytes: default_max_response_bytes(),
            kubeconfig: None,
        }
    }
}

impl AgentConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: AgentConfig = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    /// Check the fields the agent cannot start without.
    pub fn validate(&self) -> Result<()> {
        match self.api_endpoint.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(LockError::Config(
                    "API endpoint not defined (set API_ENDPOINT or pass --api-endpoint)".into(),
                ))
            }
            Some(_) => {}
        }
        if self.interval_secs == 0 {
            return Err(LockError::Config(
                "polling interval must be at least one second".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(LockError::Config(
                "request timeout must be at least one second".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn client_config(&self) -> Result<ClientConfig> {
        self.validate()?;
        let endpoint = self.api_endpoint.clone().unwrap_or_default();
        Ok(ClientConfig::new(endpoint.trim())
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_max_response_bytes(self.max_response_bytes))
    }
}
