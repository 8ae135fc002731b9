use std::path::Path;
use std::time::Duration;

use faultkit::{ConfigError, ExceptionHandlingConfig, LoggingConfig, load_config};
use serde::{Deserialize, Serialize};

/// Environment prefix; `FAULTKIT__SERVER__BIND_ADDR` sets `server.bind_addr`.
pub const ENV_PREFIX: &str = "FAULTKIT__";

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_owned()
}

fn default_downstream_base_url() -> String {
    "http://127.0.0.1:9000".to_owned()
}

fn default_downstream_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Every `/proxy/{path}` request is forwarded to `{downstream_base_url}/{path}`.
    #[serde(default = "default_downstream_base_url")]
    pub downstream_base_url: String,

    #[serde(default = "default_downstream_timeout_ms")]
    pub downstream_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            downstream_base_url: default_downstream_base_url(),
            downstream_timeout_ms: default_downstream_timeout_ms(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn downstream_timeout(&self) -> Duration {
        Duration::from_millis(self.downstream_timeout_ms)
    }

    /// Replace the port of `bind_addr`, keeping the host.
    pub fn override_port(&mut self, port: u16) {
        let host = self
            .bind_addr
            .rsplit_once(':')
            .map_or(self.bind_addr.as_str(), |(host, _)| host);
        self.bind_addr = format!("{host}:{port}");
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub exception_handling: ExceptionHandlingConfig,
}

impl AppConfig {
    /// defaults -> YAML (if provided) -> env (`FAULTKIT__*`)
    ///
    /// # Errors
    /// Fails when the file is missing or the merged document is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        load_config(path, ENV_PREFIX)
    }
}
