//! Configuration management for the family tree LCA resolver
use crate::error::LcaError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.wikitree.com/api.php";
pub const DEFAULT_DEPTH: u32 = 4;

const SUPPORTED_FORMATS: [&str; 3] = ["text", "markdown", "json"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiSettings,
    pub cache: CacheSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    /// Generations requested per `getAncestors` call
    pub depth: u32,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    pub enabled: bool,
    pub directory: PathBuf,
    /// Serve from the cache only, never hit the API
    pub offline: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    pub format: String,
    pub render: bool,
    pub render_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                base_url: DEFAULT_API_URL.to_string(),
                depth: DEFAULT_DEPTH,
                timeout_seconds: 30,
                max_retries: 3,
            },
            cache: CacheSettings {
                enabled: true,
                directory: PathBuf::from(".family-lca-cache"),
                offline: false,
            },
            output: OutputSettings {
                format: "text".to_string(),
                render: false,
                render_directory: PathBuf::from("."),
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| "Failed to parse configuration file")?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override settings with `FAMILY_LCA_*` environment variables if present
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("FAMILY_LCA_API_URL") {
            self.api.base_url = url;
        }

        if let Ok(depth) = std::env::var("FAMILY_LCA_DEPTH") {
            self.api.depth = depth.parse().context("FAMILY_LCA_DEPTH must be a number")?;
        }

        if let Ok(timeout) = std::env::var("FAMILY_LCA_TIMEOUT_SECONDS") {
            self.api.timeout_seconds = timeout
                .parse()
                .context("FAMILY_LCA_TIMEOUT_SECONDS must be a number")?;
        }

        if let Ok(retries) = std::env::var("FAMILY_LCA_MAX_RETRIES") {
            self.api.max_retries = retries.parse().context("FAMILY_LCA_MAX_RETRIES must be a number")?;
        }

        if let Ok(directory) = std::env::var("FAMILY_LCA_CACHE_DIR") {
            self.cache.directory = PathBuf::from(directory);
            self.cache.enabled = true;
        }

        if let Ok(offline) = std::env::var("FAMILY_LCA_OFFLINE") {
            self.cache.offline = offline.parse().context("FAMILY_LCA_OFFLINE must be true or false")?;
        }

        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge_with(&mut self, other: Config) {
        let defaults = Config::default();

        // Merge API settings
        if other.api.base_url != defaults.api.base_url {
            self.api.base_url = other.api.base_url;
        }
        if other.api.depth != defaults.api.depth {
            self.api.depth = other.api.depth;
        }
        if other.api.timeout_seconds != defaults.api.timeout_seconds {
            self.api.timeout_seconds = other.api.timeout_seconds;
        }
        if other.api.max_retries != defaults.api.max_retries {
            self.api.max_retries = other.api.max_retries;
        }

        // Merge cache settings
        self.cache.enabled = other.cache.enabled;
        self.cache.offline = other.cache.offline;
        if other.cache.directory != defaults.cache.directory {
            self.cache.directory = other.cache.directory;
        }

        // Merge output settings
        if other.output.format != defaults.output.format {
            self.output.format = other.output.format;
        }
        self.output.render = other.output.render;
        if other.output.render_directory != defaults.output.render_directory {
            self.output.render_directory = other.output.render_directory;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(LcaError::Config("API base URL must not be empty".to_string()).into());
        }

        if self.api.depth == 0 {
            return Err(LcaError::Config("Ancestor depth must be greater than 0".to_string()).into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(LcaError::Config("API timeout must be greater than 0".to_string()).into());
        }

        if self.api.max_retries == 0 {
            return Err(LcaError::Config("At least one fetch attempt is required".to_string()).into());
        }

        if self.cache.offline && !self.cache.enabled {
            return Err(LcaError::Config("Offline mode requires the response cache to be enabled".to_string()).into());
        }

        if !SUPPORTED_FORMATS.contains(&self.output.format.to_lowercase().as_str()) {
            return Err(LcaError::Config(format!(
                "Unsupported output format '{}', expected one of {:?}",
                self.output.format, SUPPORTED_FORMATS
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_config_save_and_load() {
        let mut config = Config::default();
        config.api.depth = 7;
        let temp_file = NamedTempFile::new().unwrap();

        // Save config
        config.save_to_file(temp_file.path()).await.unwrap();

        // Load config
        let loaded_config = Config::load_from_file(temp_file.path()).await.unwrap();

        assert_eq!(loaded_config.api.depth, 7);
        assert_eq!(config.api.base_url, loaded_config.api.base_url);
        assert_eq!(config.cache.directory, loaded_config.cache.directory);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_file(dir.path().join("missing.yml")).await.is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        // Test invalid depth
        config.api.depth = 0;
        assert!(config.validate().is_err());

        // Reset and test unknown format
        config = Config::default();
        config.output.format = "pdf".to_string();
        assert!(config.validate().is_err());

        // Offline without a cache has nothing to read
        config = Config::default();
        config.cache.enabled = false;
        config.cache.offline = true;
        let error = config.validate().unwrap_err();
        assert!(matches!(error.downcast_ref::<LcaError>(), Some(LcaError::Config(_))));
    }

    #[test]
    fn test_config_merge() {
        let mut base_config = Config::default();
        let mut override_config = Config::default();

        override_config.api.depth = 10;
        override_config.output.format = "json".to_string();
        override_config.output.render = true;

        base_config.merge_with(override_config);

        assert_eq!(base_config.api.depth, 10);
        assert_eq!(base_config.output.format, "json");
        assert!(base_config.output.render);
        assert_eq!(base_config.api.base_url, DEFAULT_API_URL);
    }
}
