//! mihomo-pool - Entry Point
//!
//! One-shot pipeline: load subscription, build the pool, emit the runtime
//! configuration, regenerate docker-compose and restart the container.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod emitter;
mod error;
mod models;
mod orchestrator;
mod pool;
mod subscription;

use config::{Config, LogConfig};
use emitter::RuntimeConfig;
use error::PoolError;
use orchestrator::{ComposeConfig, ComposeRuntime};
use pool::Pool;
use subscription::{SubscriptionLoader, SubscriptionSource};

#[derive(Parser)]
#[command(name = "mihomo-pool")]
#[command(about = "Generate a local mihomo proxy pool from a subscription", long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "file"])))]
struct Cli {
    /// Subscription URL
    #[arg(short, long)]
    url: Option<String>,

    /// Path to a local subscription file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// First local listener port (overrides PROXY_POOL_START_PORT)
    #[arg(long)]
    start_port: Option<u16>,

    /// Write configuration only; do not touch the container
    #[arg(long)]
    skip_restart: bool,
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    init_tracing(&config.log);

    info!("Starting mihomo-pool");

    let source = match (&cli.url, &cli.file) {
        (Some(url), _) => SubscriptionSource::remote(url)?,
        (_, Some(path)) => SubscriptionSource::Local(path.clone()),
        _ => {
            return Err(PoolError::InvalidConfig(
                "either --url or --file is required".into(),
            ))
        }
    };

    // Load subscription
    let loader = SubscriptionLoader::new()?;
    let raw = loader.load(&source).await?;

    // Build the pool
    let start_port = cli.start_port.unwrap_or(config.pool.start_port);
    let pool = Pool::build(raw, start_port)?;
    if pool.is_empty() {
        warn!("Every subscription entry was filtered out; emitting an empty pool");
    }

    // Emit the runtime configuration
    let runtime_config = RuntimeConfig::new(&config, &pool);
    let config_path = config.runtime_config_path();
    emitter::write_runtime_config(&config_path, &runtime_config).await?;

    if cli.skip_restart {
        info!("Skipping container restart (--skip-restart)");
        return Ok(());
    }

    // Restart the containerized runtime against the new configuration
    let runtime = ComposeRuntime::new(&config.runtime.compose_file);
    match runtime.down().await {
        Ok(status) => debug!(status = status.as_str(), "Stopped runtime container"),
        Err(e) => warn!("Runtime was not running or stop failed: {}", e),
    }

    let absolute_config_path = tokio::fs::canonicalize(&config_path).await?;
    let compose = ComposeConfig::new(&absolute_config_path, &config.runtime.image);
    orchestrator::write_compose_config(&config.runtime.compose_file, &compose).await?;

    let status = runtime.up().await?;
    debug!(status = status.as_str(), "Started runtime container");

    info!(
        proxies = pool.len(),
        first_port = start_port,
        "Proxy pool is up"
    );
    Ok(())
}

/// Initialize tracing from the logging configuration; RUST_LOG wins when set
fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("mihomo_pool={}", log.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if log.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
