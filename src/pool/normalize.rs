//! Normalization and filtering of subscription descriptors
//!
//! Pure, order-preserving pass over the raw descriptor list:
//! - drops vless entries with an unsupported flow-control mode
//! - rewrites legacy ChaCha20-Poly1305 cipher names to the identifier the
//!   runtime expects
//! - drops entries a prior health check marked as failing
//! - resolves display-name collisions deterministically

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::models::{ProxyDescriptor, ProxyKind};

/// Cipher identifier the mihomo runtime requires for ChaCha20-Poly1305
pub const RUNTIME_CHACHA20_CIPHER: &str = "chacha20-ietf-poly1305";

/// Legacy ChaCha20-Poly1305 identifiers produced by subscription converters.
/// Enumerated explicitly so an unrelated cipher name can never match.
const LEGACY_CHACHA20_CIPHERS: &[&str] = &[
    "chacha20-poly1305",
    "aead_chacha20_poly1305",
    "aead-chacha20-poly1305",
];

/// Normalize and filter descriptors, preserving the relative input order of
/// survivors. Every drop emits one diagnostic line; rewrites are logged at
/// debug level.
pub fn normalize_proxies(proxies: Vec<ProxyDescriptor>) -> Vec<ProxyDescriptor> {
    let mut survivors = Vec::with_capacity(proxies.len());
    let mut taken_names: HashSet<String> = HashSet::new();

    for mut proxy in proxies {
        if has_unsupported_flow(&proxy) {
            warn!(
                endpoint = %proxy.endpoint_key(),
                flow = proxy.flow.as_deref().unwrap_or_default(),
                "Dropping vless proxy with unsupported flow-control mode"
            );
            continue;
        }

        if let Some(rewritten) = rewrite_legacy_cipher(&proxy) {
            debug!(
                endpoint = %proxy.endpoint_key(),
                from = proxy.cipher.as_deref().unwrap_or_default(),
                to = rewritten.as_str(),
                "Rewrote legacy cipher identifier"
            );
            proxy.cipher = Some(rewritten);
        }

        if proxy.fail_count > 0 {
            warn!(
                endpoint = %proxy.endpoint_key(),
                fail_count = proxy.fail_count,
                "Dropping proxy with prior health-check failures"
            );
            continue;
        }

        let name = unique_name(&proxy.name, &taken_names);
        taken_names.insert(name.clone());
        proxy.name = name;
        survivors.push(proxy);
    }

    survivors
}

/// The runtime rejects vless flow-control modes for pool listeners; an empty
/// or absent `flow` is plain vless and stays.
fn has_unsupported_flow(proxy: &ProxyDescriptor) -> bool {
    proxy.kind == ProxyKind::Vless && proxy.flow.as_deref().is_some_and(|f| !f.is_empty())
}

/// Returns the replacement cipher name if this descriptor carries a legacy
/// ChaCha20-Poly1305 identifier, `None` if no rewrite is needed.
fn rewrite_legacy_cipher(proxy: &ProxyDescriptor) -> Option<String> {
    if proxy.kind != ProxyKind::Ss {
        return None;
    }
    let cipher = proxy.cipher.as_deref()?;
    if LEGACY_CHACHA20_CIPHERS.contains(&cipher) {
        Some(RUNTIME_CHACHA20_CIPHER.to_string())
    } else {
        None
    }
}

/// First unused name: the original if free, otherwise `name-1`, `name-2`, …
/// Suffixes always attach to the original name, never to a suffixed one.
fn unique_name(name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }
    let mut i = 1;
    loop {
        let candidate = format!("{}-{}", name, i);
        if !taken.contains(&candidate) {
            return candidate;
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, server: &str, port: u16, kind: &str) -> ProxyDescriptor {
        let yaml = format!(
            "name: {}\nserver: {}\nport: {}\ntype: {}\n",
            name, server, port, kind
        );
        serde_yaml::from_str(&yaml).unwrap()
    }

    #[test]
    fn test_collision_free_input_is_untouched() {
        let input = vec![
            descriptor("a", "1.1.1.1", 443, "trojan"),
            descriptor("b", "1.1.1.2", 443, "vmess"),
        ];
        let names: Vec<String> = normalize_proxies(input)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_name_collisions_get_numeric_suffixes() {
        let input = vec![
            descriptor("A", "1.1.1.1", 443, "trojan"),
            descriptor("A", "1.1.1.2", 443, "trojan"),
            descriptor("A", "1.1.1.3", 443, "trojan"),
        ];
        let names: Vec<String> = normalize_proxies(input)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["A", "A-1", "A-2"]);
    }

    #[test]
    fn test_suffix_skips_names_already_present_in_input() {
        // "A-1" arrives as a real name before the second "A" needs a suffix
        let input = vec![
            descriptor("A", "1.1.1.1", 443, "trojan"),
            descriptor("A-1", "1.1.1.2", 443, "trojan"),
            descriptor("A", "1.1.1.3", 443, "trojan"),
        ];
        let names: Vec<String> = normalize_proxies(input)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["A", "A-1", "A-2"]);
    }

    #[test]
    fn test_vless_with_flow_is_dropped() {
        let mut flowed = descriptor("v1", "1.1.1.1", 443, "vless");
        flowed.flow = Some("xtls-rprx-vision".to_string());
        let mut empty_flow = descriptor("v2", "1.1.1.2", 443, "vless");
        empty_flow.flow = Some(String::new());
        let plain = descriptor("v3", "1.1.1.3", 443, "vless");

        let names: Vec<String> = normalize_proxies(vec![flowed, empty_flow, plain])
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["v2", "v3"]);
    }

    #[test]
    fn test_flow_on_non_vless_is_ignored() {
        let mut trojan = descriptor("t1", "1.1.1.1", 443, "trojan");
        trojan.flow = Some("xtls-rprx-vision".to_string());
        assert_eq!(normalize_proxies(vec![trojan]).len(), 1);
    }

    #[test]
    fn test_legacy_chacha20_cipher_is_rewritten() {
        for legacy in LEGACY_CHACHA20_CIPHERS {
            let mut ss = descriptor("s", "1.1.1.1", 443, "ss");
            ss.cipher = Some(legacy.to_string());
            let out = normalize_proxies(vec![ss]);
            assert_eq!(out[0].cipher.as_deref(), Some(RUNTIME_CHACHA20_CIPHER));
        }
    }

    #[test]
    fn test_other_ciphers_are_left_alone() {
        let mut ss = descriptor("s", "1.1.1.1", 443, "ss");
        ss.cipher = Some("aes-256-gcm".to_string());
        let out = normalize_proxies(vec![ss]);
        assert_eq!(out[0].cipher.as_deref(), Some("aes-256-gcm"));
    }

    #[test]
    fn test_cipher_rewrite_only_applies_to_shadowsocks() {
        let mut vmess = descriptor("v", "1.1.1.1", 443, "vmess");
        vmess.cipher = Some("chacha20-poly1305".to_string());
        let out = normalize_proxies(vec![vmess]);
        assert_eq!(out[0].cipher.as_deref(), Some("chacha20-poly1305"));
    }

    #[test]
    fn test_failing_proxies_are_dropped() {
        let mut failing = descriptor("bad", "1.1.1.1", 443, "trojan");
        failing.fail_count = 2;
        let mut clean = descriptor("ok", "1.1.1.2", 443, "trojan");
        clean.fail_count = 0;
        let fresh = descriptor("new", "1.1.1.3", 443, "trojan");

        let names: Vec<String> = normalize_proxies(vec![failing, clean, fresh])
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["ok", "new"]);
    }

    #[test]
    fn test_drops_preserve_relative_order() {
        let mut input = Vec::new();
        for i in 0..6u16 {
            let mut p = descriptor(&format!("p{}", i), "1.1.1.1", 1000 + i, "trojan");
            if i % 2 == 1 {
                p.fail_count = 1;
            }
            input.push(p);
        }
        let names: Vec<String> = normalize_proxies(input)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["p0", "p2", "p4"]);
    }

    #[test]
    fn test_output_names_are_pairwise_distinct() {
        let input = vec![
            descriptor("x", "1.1.1.1", 443, "trojan"),
            descriptor("x", "1.1.1.2", 443, "trojan"),
            descriptor("y", "1.1.1.3", 443, "trojan"),
            descriptor("x", "1.1.1.4", 443, "trojan"),
            descriptor("y", "1.1.1.5", 443, "trojan"),
        ];
        let names: Vec<String> = normalize_proxies(input)
            .into_iter()
            .map(|p| p.name)
            .collect();
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(normalize_proxies(Vec::new()).is_empty());
    }
}
