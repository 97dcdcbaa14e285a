use crate::source::{parse_ancestors_response, AncestorSource};
use crate::types::AncestorRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// On-disk store of raw `getAncestors` responses, one file per key
#[derive(Debug, Clone)]
pub struct ResponseCache {
    directory: PathBuf,
}

impl ResponseCache {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// `ancestors_<key>.json`, with anything outside `[A-Za-z0-9_-]` replaced
    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.directory.join(format!("ancestors_{}.json", safe_key))
    }

    /// Persist a raw response body
    pub async fn store(&self, key: &str, body: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .with_context(|| format!("Failed to create cache directory {:?}", self.directory))?;

        let path = self.path_for(key);
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("Failed to write cached response to {:?}", path))?;

        debug!("Cached ancestors of {} at {:?}", key, path);
        Ok(path)
    }

    /// Raw response body for `key`, if cached
    pub async fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!("No cached response for {} at {:?}", key, path);
            return Ok(None);
        }

        let body = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read cached response from {:?}", path))?;
        Ok(Some(body))
    }
}

/// Serves ancestor lists from previously cached responses only
#[derive(Debug, Clone)]
pub struct FileSource {
    cache: ResponseCache,
}

impl FileSource {
    pub fn new(cache: ResponseCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl AncestorSource for FileSource {
    async fn fetch_ancestors(&self, key: &str) -> Result<Option<Vec<AncestorRecord>>> {
        let Some(body) = self.cache.load(key).await? else {
            warn!("No cached ancestors for {} in {:?}", key, self.cache.directory());
            return Ok(None);
        };

        match parse_ancestors_response(&body) {
            Ok(records) => {
                info!("Loaded cached ancestors of {}", key);
                Ok(records)
            }
            Err(e) => {
                warn!("Discarding unreadable cached response for {}: {:#}", key, e);
                Ok(None)
            }
        }
    }
}

/// Read ancestor records from a response file saved by hand or by the cache
pub async fn read_response_file<P: AsRef<Path>>(path: P) -> Result<Option<Vec<AncestorRecord>>> {
    let path = path.as_ref();
    let body = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read ancestor file {:?}", path))?;

    parse_ancestors_response(&body).with_context(|| format!("Invalid ancestor file {:?}", path))
}
