use std::time::Duration;

use anyhow::{Context, ensure};
use serde::{Deserialize, de::DeserializeOwned};

use crate::retry::RetryPolicy;

/// Process configuration, read once from the environment at start-up.
#[derive(Debug, Clone, Deserialize)]
pub struct HarvesterConfig {
    /// Token a caller must present to start a scrape.
    pub api_token: String,
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Postgres price cache when set, in-process cache otherwise.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_page_concurrency")]
    pub page_concurrency: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_requests_per_sec")]
    pub requests_per_sec: u32,
}

fn default_catalog_url() -> String {
    "https://dentalstall.com/shop/".to_string()
}

fn default_storage_path() -> String {
    "data/products.json".to_string()
}

fn default_page_concurrency() -> usize {
    3
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_requests_per_sec() -> u32 {
    10
}

impl HarvesterConfig {
    pub fn new() -> anyhow::Result<Self> {
        let config = Self::load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Same as [`HarvesterConfig::new`] but from explicit `(NAME, value)` pairs.
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Self>(vars)
            .context("failed to load env variables into config struct")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.api_token.trim().is_empty(), "API_TOKEN must not be empty");
        ensure!(self.page_concurrency > 0, "PAGE_CONCURRENCY must be at least 1");
        ensure!(self.max_attempts > 0, "MAX_ATTEMPTS must be at least 1");
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.retry_delay_secs))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
