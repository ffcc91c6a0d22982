//! Subscription loading
//!
//! Obtains the raw proxy descriptor list from a remote subscription URL or a
//! local Clash-style YAML file. Documents may nest further subscriptions
//! under `proxy-providers`; those are followed breadth-first, de-duplicating
//! already-visited URLs. A provider that fails to fetch or parse is logged
//! and skipped; only the primary document is load-bearing.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{PoolError, Result};
use crate::models::ProxyDescriptor;

/// User-Agent subscription endpoints expect from a mihomo client
const SUBSCRIPTION_USER_AGENT: &str = "Clash.Meta; Mihomo";

/// Where the subscription document comes from
#[derive(Debug, Clone)]
pub enum SubscriptionSource {
    Remote(Url),
    Local(PathBuf),
}

impl SubscriptionSource {
    /// Parse a remote source from a raw URL string
    pub fn remote(raw: &str) -> Result<Self> {
        Ok(SubscriptionSource::Remote(Url::parse(raw)?))
    }
}

/// Document shape of a Clash/mihomo subscription
#[derive(Debug, Deserialize)]
struct RawSubscription {
    #[serde(default)]
    proxies: Vec<ProxyDescriptor>,
    #[serde(default, rename = "proxy-providers")]
    providers: HashMap<String, ProviderEntry>,
}

#[derive(Debug, Deserialize)]
struct ProviderEntry {
    url: Option<String>,
}

/// Loads and parses subscription documents
pub struct SubscriptionLoader {
    client: reqwest::Client,
}

impl SubscriptionLoader {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(SUBSCRIPTION_USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Load the full descriptor list for one source, following nested
    /// providers. Errors if no descriptor was collected at all.
    pub async fn load(&self, source: &SubscriptionSource) -> Result<Vec<ProxyDescriptor>> {
        let mut proxies = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut pending: VecDeque<Url> = VecDeque::new();

        // The primary document: any failure here is fatal.
        let body = match source {
            SubscriptionSource::Local(path) => {
                info!(path = %path.display(), "Reading local subscription");
                tokio::fs::read_to_string(path).await?
            }
            SubscriptionSource::Remote(url) => {
                info!(url = %url, "Fetching subscription");
                visited.insert(url.to_string());
                self.fetch(url).await?
            }
        };
        let doc = parse_document(&body)?;
        collect_document(doc, &mut proxies, &mut visited, &mut pending);

        // Nested providers: best effort, one level of the queue at a time.
        while let Some(url) = pending.pop_front() {
            debug!(url = %url, "Fetching provider subscription");
            let body = match self.fetch(&url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(url = %url, error = %e, "Skipping provider: fetch failed");
                    continue;
                }
            };
            match parse_document(&body) {
                Ok(doc) => collect_document(doc, &mut proxies, &mut visited, &mut pending),
                Err(e) => warn!(url = %url, error = %e, "Skipping provider: parse failed"),
            }
        }

        if proxies.is_empty() {
            return Err(PoolError::NoProxiesAvailable);
        }

        info!(count = proxies.len(), "Loaded subscription proxies");
        Ok(proxies)
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        let body = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

fn parse_document(body: &str) -> Result<RawSubscription> {
    Ok(serde_yaml::from_str(body)?)
}

fn collect_document(
    doc: RawSubscription,
    proxies: &mut Vec<ProxyDescriptor>,
    visited: &mut HashSet<String>,
    pending: &mut VecDeque<Url>,
) {
    proxies.extend(doc.proxies);

    for (name, provider) in doc.providers {
        let Some(raw) = provider.url else {
            continue;
        };
        let url = match Url::parse(&raw) {
            Ok(url) => url,
            Err(e) => {
                warn!(provider = name.as_str(), error = %e, "Skipping provider: invalid URL");
                continue;
            }
        };
        if visited.insert(url.to_string()) {
            pending.push_back(url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_DOC: &str = r#"
proxies:
  - name: tokyo-01
    server: 1.1.1.1
    port: 443
    type: trojan
    password: secret
  - name: osaka-02
    server: 1.1.1.2
    port: 8443
    type: ss
    cipher: aes-256-gcm
    password: secret
"#;

    #[test]
    fn test_parse_document_proxies() {
        let doc = parse_document(SAMPLE_DOC).unwrap();
        assert_eq!(doc.proxies.len(), 2);
        assert_eq!(doc.proxies[0].name, "tokyo-01");
        assert!(doc.providers.is_empty());
    }

    #[test]
    fn test_parse_document_rejects_malformed_descriptor() {
        // missing `server`
        let doc = "proxies:\n  - name: broken\n    port: 443\n    type: trojan\n";
        assert!(parse_document(doc).is_err());
    }

    #[test]
    fn test_collect_document_queues_unvisited_providers() {
        let doc: RawSubscription = serde_yaml::from_str(
            r#"
proxies: []
proxy-providers:
  primary:
    url: https://example.com/sub.yaml
    type: http
  seen-before:
    url: https://example.com/old.yaml
  no-url:
    type: file
"#,
        )
        .unwrap();

        let mut proxies = Vec::new();
        let mut visited: HashSet<String> =
            std::iter::once("https://example.com/old.yaml".to_string()).collect();
        let mut pending = VecDeque::new();
        collect_document(doc, &mut proxies, &mut visited, &mut pending);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].as_str(), "https://example.com/sub.yaml");
    }

    #[test]
    fn test_source_remote_rejects_invalid_url() {
        assert!(SubscriptionSource::remote("not a url").is_err());
    }

    #[tokio::test]
    async fn test_load_from_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_DOC.as_bytes()).unwrap();

        let loader = SubscriptionLoader::new().unwrap();
        let source = SubscriptionSource::Local(file.path().to_path_buf());
        let proxies = loader.load(&source).await.unwrap();

        assert_eq!(proxies.len(), 2);
        assert_eq!(proxies[1].name, "osaka-02");
    }

    #[tokio::test]
    async fn test_load_errors_when_nothing_collected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"proxies: []\n").unwrap();

        let loader = SubscriptionLoader::new().unwrap();
        let source = SubscriptionSource::Local(file.path().to_path_buf());
        let err = loader.load(&source).await.unwrap_err();
        assert!(matches!(err, PoolError::NoProxiesAvailable));
    }
}
