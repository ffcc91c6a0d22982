//! Runtime configuration emission
//!
//! Serializes the pool into the mihomo declarative YAML format. The emitted
//! value is constructed fresh per invocation from `Config` + `Pool`; the
//! emitter has no say in ordering, naming, or filtering decisions.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::models::{ListenerDescriptor, ProxyDescriptor};
use crate::pool::Pool;

/// The mihomo runtime configuration document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    pub allow_lan: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<String>>,
    pub listeners: Vec<ListenerDescriptor>,
    pub proxies: Vec<ProxyDescriptor>,
}

impl RuntimeConfig {
    /// Assemble the runtime document for one pool
    pub fn new(config: &Config, pool: &Pool) -> Self {
        Self {
            allow_lan: config.runtime.allow_lan,
            authentication: config.authentication(),
            listeners: pool.listeners().to_vec(),
            proxies: pool.proxies().to_vec(),
        }
    }
}

/// Write the runtime configuration to `path`, creating parent directories
/// as needed. Returns the serialized document for logging/testing.
pub async fn write_runtime_config(path: &Path, config: &RuntimeConfig) -> Result<String> {
    let yaml = serde_yaml::to_string(config)?;

    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, &yaml).await?;

    info!(
        path = %path.display(),
        proxies = config.proxies.len(),
        "Wrote runtime configuration"
    );
    Ok(yaml)
}
