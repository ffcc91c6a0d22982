//! Container orchestration
//!
//! Generates the docker-compose descriptor for the proxy runtime and drives
//! the container lifecycle through a narrow start/stop interface. Process
//! invocation stays here; the pool core never shells out.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::process::Command;
use tracing::info;

use crate::error::{PoolError, Result};

/// Mount point of the runtime configuration inside the container
const CONTAINER_CONFIG_PATH: &str = "/etc/mihomo/config.yaml";

/// docker-compose document for the proxy runtime
#[derive(Debug, Clone, Serialize)]
pub struct ComposeConfig {
    services: ComposeServices,
}

#[derive(Debug, Clone, Serialize)]
struct ComposeServices {
    mihomo: ComposeService,
}

#[derive(Debug, Clone, Serialize)]
struct ComposeService {
    container_name: String,
    restart: String,
    network_mode: String,
    volumes: Vec<ComposeVolume>,
    image: String,
    command: String,
}

#[derive(Debug, Clone, Serialize)]
struct ComposeVolume {
    #[serde(rename = "type")]
    kind: String,
    bind: BindOptions,
    source: String,
    target: String,
}

#[derive(Debug, Clone, Serialize)]
struct BindOptions {
    propagation: String,
}

impl ComposeConfig {
    /// One `mihomo` service on host networking, bind-mounting the generated
    /// runtime config. `runtime_config_path` must be absolute; compose
    /// resolves relative bind sources against its own file location.
    pub fn new(runtime_config_path: &Path, image: &str) -> Self {
        Self {
            services: ComposeServices {
                mihomo: ComposeService {
                    container_name: "mihomo".to_string(),
                    restart: "always".to_string(),
                    network_mode: "host".to_string(),
                    volumes: vec![ComposeVolume {
                        kind: "bind".to_string(),
                        bind: BindOptions {
                            propagation: "rprivate".to_string(),
                        },
                        source: runtime_config_path.display().to_string(),
                        target: CONTAINER_CONFIG_PATH.to_string(),
                    }],
                    image: image.to_string(),
                    command: format!("-f {}", CONTAINER_CONFIG_PATH),
                },
            },
        }
    }
}

/// Write the compose descriptor to `path`
pub async fn write_compose_config(path: &Path, config: &ComposeConfig) -> Result<()> {
    let yaml = serde_yaml::to_string(config)?;
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(dir).await?;
        }
    }
    tokio::fs::write(path, yaml).await?;
    info!(path = %path.display(), "Wrote compose descriptor");
    Ok(())
}

/// Narrow interface to the containerized runtime: start and stop against one
/// compose file, returning the runtime's diagnostic output.
pub struct ComposeRuntime {
    compose_file: PathBuf,
}

impl ComposeRuntime {
    pub fn new(compose_file: impl Into<PathBuf>) -> Self {
        Self {
            compose_file: compose_file.into(),
        }
    }

    /// Start (or restart) the runtime container
    pub async fn up(&self) -> Result<String> {
        self.run(&["up", "-d", "--remove-orphans"]).await
    }

    /// Stop the runtime container
    pub async fn down(&self) -> Result<String> {
        self.run(&["down"]).await
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("docker")
            .arg("compose")
            .arg("-f")
            .arg(&self.compose_file)
            .args(args)
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(PoolError::Orchestrator(format!(
                "docker compose {} failed ({}): {}",
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }

        // compose writes progress to stderr even on success
        Ok(format!("{}{}", stdout, stderr).trim().to_string())
    }
}
