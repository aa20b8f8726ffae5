//! Application configuration

use std::collections::HashMap;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthcheckConfig {
    pub server: ServerConfig,
    /// `;`-separated names left out of the startup registration.
    pub exclude_checks: Option<String>,
    /// Handed through to every provider unmodified at discovery time.
    pub environment: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HealthcheckConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            exclude_checks: None,
            environment: HashMap::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl HealthcheckConfig {
    /// Layers an optional `healthcheck.*` file under `HEALTHCHECK__`-prefixed
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("healthcheck").required(false))
            .add_source(Environment::with_prefix("HEALTHCHECK").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
