//! Local listener port allocation
//!
//! Survivor `i` gets port `start_port + i`: consecutive, strictly increasing,
//! no gaps or reuse. The only failure is a range check: the last allocated
//! port must not exceed the maximum port number.

use crate::error::{PoolError, Result};
use crate::models::{ListenerDescriptor, ProxyDescriptor};

/// Allocate one `mixed` listener per proxy, in matching order.
///
/// Errors when `start_port + len - 1` would pass 65535; wrapping would hand
/// out duplicate ports and duplicate listener names.
pub fn allocate_listeners(
    proxies: &[ProxyDescriptor],
    start_port: u16,
) -> Result<Vec<ListenerDescriptor>> {
    if let Some(last) = proxies.len().checked_sub(1) {
        let last_port = start_port as usize + last;
        if last_port > u16::MAX as usize {
            return Err(PoolError::InvalidConfig(format!(
                "{} listeners starting at port {} would end at {}, past the maximum port {}",
                proxies.len(),
                start_port,
                last_port,
                u16::MAX
            )));
        }
    }

    Ok(proxies
        .iter()
        .enumerate()
        .map(|(i, proxy)| ListenerDescriptor::new(start_port + i as u16, proxy.name.as_str()))
        .collect())
}
