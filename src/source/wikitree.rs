use crate::config::ApiSettings;
use crate::error::LcaError;
use crate::source::{parse_ancestors_response, AncestorSource, ResponseCache};
use crate::types::AncestorRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use regex::Regex;
use reqwest::Client;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// WikiTree API client for `getAncestors` lookups
pub struct WikiTreeClient {
    client: Client,
    base_url: String,
    depth: u32,
    max_retries: u32,
    key_pattern: Regex,
    cache: Option<ResponseCache>,
}

impl WikiTreeClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(concat!("family-lca/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        // "Surname-123" profile names or bare numeric ids
        let key_pattern = Regex::new(r"^(\d+|[^\s\-][^\s]*-\d+)$").context("Invalid key pattern")?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            depth: settings.depth,
            max_retries: settings.max_retries.max(1),
            key_pattern,
            cache: None,
        })
    }

    /// Write every successful raw response to `cache`
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn validate_key(&self, key: &str) -> std::result::Result<(), LcaError> {
        if self.key_pattern.is_match(key) {
            Ok(())
        } else {
            Err(LcaError::InvalidKey(key.to_string()))
        }
    }

    /// GET the raw response body, retrying connection failures and 5xx
    async fn request(&self, key: &str) -> Result<String> {
        let depth = self.depth.to_string();
        let params = [
            ("action", "getAncestors"),
            ("format", "json"),
            ("key", key),
            ("depth", depth.as_str()),
        ];

        let attempts = AtomicU32::new(0);
        let attempts = &attempts;
        let max_retries = self.max_retries;
        let client = &self.client;
        let url = self.base_url.as_str();
        let params = &params;

        let policy = ExponentialBackoff {
            initial_interval: Duration::from_millis(500),
            max_elapsed_time: Some(Duration::from_secs(60)),
            ..ExponentialBackoff::default()
        };

        let body = backoff::future::retry(policy, || async move {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            debug!("getAncestors attempt {} for {}", attempt, key);

            let classify = |e: reqwest::Error| {
                let transient = e.is_connect()
                    || e.is_timeout()
                    || e.status().map_or(false, |status| status.is_server_error());
                if transient && attempt < max_retries {
                    warn!("Transient error fetching {} (attempt {}): {}", key, attempt, e);
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            };

            let response = client.get(url).query(params).send().await.map_err(classify)?;
            let response = response.error_for_status().map_err(classify)?;
            response.text().await.map_err(classify)
        })
        .await?;

        Ok(body)
    }
}

#[async_trait]
impl AncestorSource for WikiTreeClient {
    #[instrument(skip(self))]
    async fn fetch_ancestors(&self, key: &str) -> Result<Option<Vec<AncestorRecord>>> {
        self.validate_key(key)?;
        info!("Fetching ancestors of {} (depth {})", key, self.depth);

        let body = match self.request(key).await {
            Ok(body) => body,
            Err(e) => {
                warn!("HTTP error occurred while fetching ancestors for {}: {:#}", key, e);
                return Ok(None);
            }
        };

        let records = match parse_ancestors_response(&body) {
            Ok(Some(records)) => records,
            Ok(None) => {
                warn!("WikiTree returned no ancestor list for {}", key);
                return Ok(None);
            }
            Err(e) => {
                warn!("Unreadable getAncestors response for {}: {:#}", key, e);
                return Ok(None);
            }
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(key, &body).await {
                warn!("Could not cache response for {}: {:#}", key, e);
            }
        }

        info!("Fetched {} ancestor records for {}", records.len(), key);
        Ok(Some(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn client() -> WikiTreeClient {
        WikiTreeClient::new(&Config::default().api).unwrap()
    }

    #[test]
    fn test_validate_key() {
        let client = client();

        assert!(client.validate_key("Windsor-1").is_ok());
        assert!(client.validate_key("Van_Dyke-42").is_ok());
        assert!(client.validate_key("12345").is_ok());
        assert!(client.validate_key("Windsor").is_err());
        assert!(client.validate_key("").is_err());
        assert!(client.validate_key("Doe 1-2").is_err());
    }

    #[tokio::test]
    async fn test_invalid_key_never_reaches_network() {
        let client = client();
        let result = client.fetch_ancestors("not a key").await;

        let error = result.unwrap_err();
        assert!(matches!(error.downcast_ref::<LcaError>(), Some(LcaError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_unreachable_api_yields_none() {
        let mut settings = Config::default().api;
        settings.base_url = "http://127.0.0.1:9/api.php".to_string();
        settings.max_retries = 1;
        settings.timeout_seconds = 2;
        let client = WikiTreeClient::new(&settings).unwrap();

        assert!(client.fetch_ancestors("Doe-1").await.unwrap().is_none());
    }
}
