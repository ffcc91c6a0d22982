//! Subscription-to-pool transformation
//!
//! The core of the tool: takes the raw descriptor list from the loader and
//! produces the ordered (proxy, listener) pairs the emitter serializes. A
//! pool is built fresh from each subscription snapshot and never merged with
//! a previous run's pool.

pub mod allocate;
pub mod normalize;

use std::collections::HashMap;

use tracing::info;

use crate::error::Result;
use crate::models::{EndpointKey, ListenerDescriptor, ProxyDescriptor};

pub use allocate::allocate_listeners;
pub use normalize::normalize_proxies;

/// The full set of (proxy, listener) pairs produced by one run.
///
/// `proxies[i]` is forwarded through by `listeners[i]`; the two sequences
/// always have the same length and matching order.
#[derive(Debug, Clone)]
pub struct Pool {
    proxies: Vec<ProxyDescriptor>,
    listeners: Vec<ListenerDescriptor>,
    /// Read-only derived view: endpoint key → position in `proxies`
    endpoints: HashMap<EndpointKey, usize>,
}

impl Pool {
    /// Build a pool from a raw descriptor snapshot: normalize/filter, then
    /// allocate consecutive listener ports starting at `start_port`. Errors
    /// when the survivors would not fit below the maximum port.
    pub fn build(raw: Vec<ProxyDescriptor>, start_port: u16) -> Result<Self> {
        let total = raw.len();
        let proxies = normalize_proxies(raw);
        let listeners = allocate_listeners(&proxies, start_port)?;

        let endpoints = proxies
            .iter()
            .enumerate()
            .map(|(i, p)| (p.endpoint_key(), i))
            .collect();

        info!(
            total = total,
            surviving = proxies.len(),
            start_port = start_port,
            "Built proxy pool"
        );

        Ok(Self {
            proxies,
            listeners,
            endpoints,
        })
    }

    pub fn proxies(&self) -> &[ProxyDescriptor] {
        &self.proxies
    }

    pub fn listeners(&self) -> &[ListenerDescriptor] {
        &self.listeners
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Look up a surviving proxy by its `(server, port)` identity
    pub fn by_endpoint(&self, key: &EndpointKey) -> Option<&ProxyDescriptor> {
        self.endpoints.get(key).map(|&i| &self.proxies[i])
    }
}
