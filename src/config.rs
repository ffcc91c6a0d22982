use crate::error::{PoolError, Result};
use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
///
/// Built fresh per invocation and passed down the pipeline; nothing here is
/// shared mutable state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pool generation configuration
    pub pool: PoolConfig,
    /// Runtime output and orchestration configuration
    pub runtime: RuntimeConfigPaths,
    /// Listener authentication
    pub auth: AuthConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// First local listener port (default: 42001)
    pub start_port: u16,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfigPaths {
    /// Directory the generated runtime config is written to (default: configs)
    pub config_dir: PathBuf,
    /// Path of the generated docker-compose file (default: docker-compose.yml)
    pub compose_file: PathBuf,
    /// Container image running the proxy runtime (default: metacubex/mihomo)
    pub image: String,
    /// Whether the runtime accepts LAN clients (default: true)
    pub allow_lan: bool,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Username required on the generated listeners
    pub username: Option<String>,
    /// Password required on the generated listeners
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            pool: PoolConfig {
                start_port: get_env_or("PROXY_POOL_START_PORT", "42001")
                    .parse()
                    .map_err(|_| {
                        PoolError::InvalidConfig(
                            "PROXY_POOL_START_PORT must be a valid port number".into(),
                        )
                    })?,
            },
            runtime: RuntimeConfigPaths {
                config_dir: get_env_or("MIHOMO_CONFIG_DIR", "configs").into(),
                compose_file: get_env_or("MIHOMO_COMPOSE_FILE", "docker-compose.yml").into(),
                image: get_env_or("MIHOMO_IMAGE", "metacubex/mihomo"),
                allow_lan: get_env_or("MIHOMO_ALLOW_LAN", "true").parse().map_err(|_| {
                    PoolError::InvalidConfig("MIHOMO_ALLOW_LAN must be true or false".into())
                })?,
            },
            auth: AuthConfig {
                username: get_env_opt("AUTH_USER"),
                password: get_env_opt("AUTH_PASSWORD"),
            },
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format: get_env_or("LOG_FORMAT", "pretty"),
            },
        })
    }

    /// Path of the generated runtime configuration file
    pub fn runtime_config_path(&self) -> PathBuf {
        self.runtime.config_dir.join("mihomo.yaml")
    }

    /// Listener authentication entries in the runtime's `user:pass` form;
    /// only set when both credentials are configured
    pub fn authentication(&self) -> Option<Vec<String>> {
        match (&self.auth.username, &self.auth.password) {
            (Some(user), Some(pass)) => Some(vec![format!("{}:{}", user, pass)]),
            _ => None,
        }
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get environment variable, treating empty values as absent
fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
