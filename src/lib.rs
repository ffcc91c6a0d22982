//! mihomo-pool - Subscription-to-Pool Generator
//!
//! Turns a Clash/mihomo proxy subscription into a runnable local proxy-pool
//! configuration: one dedicated `mixed` listener per upstream proxy.
//!
//! ## Features
//!
//! - Remote (HTTP) and local subscription sources, with `proxy-providers`
//!   nesting
//! - Field normalization for runtime compatibility (legacy cipher names,
//!   unsupported vless flow modes)
//! - Filtering of entries a prior health check marked as failing
//! - Deterministic name deduplication and listener port allocation
//! - docker-compose regeneration and container restart

pub mod config;
pub mod emitter;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod pool;
pub mod subscription;

pub use config::Config;
pub use error::{PoolError, Result};
pub use pool::Pool;
