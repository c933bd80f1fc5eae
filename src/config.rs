use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) hn_api_base_url: String,
    pub(crate) num_stories: usize,
    pub(crate) cache_ttl: Duration,
    pub(crate) refresh_interval: Duration,
    pub(crate) item_timeout: Option<Duration>,
    pub(crate) retry_top_stories: bool,
    pub(crate) log_to_console: bool,
}

impl Config {
    /// Reads the configuration from the environment, after loading `.env` if
    /// there is one.
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e).context("Failed to load .env file");
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let parse = |key: &str| -> anyhow::Result<Option<u64>> {
            lookup(key)
                .map(|value| value.trim().parse::<u64>())
                .transpose()
                .with_context(|| format!("{key} is not a positive integer"))
        };
        let flag = |key: &str| -> anyhow::Result<bool> {
            lookup(key)
                .map(|value| value.trim().parse::<bool>())
                .transpose()
                .with_context(|| format!("{key} is not true or false"))
                .map(|value| value.unwrap_or(false))
        };

        let config = Config {
            hn_api_base_url: lookup("HN_API_BASE_URL")
                .unwrap_or_else(|| crate::hn_api::DEFAULT_BASE_URL.to_string()),
            num_stories: parse("NUM_STORIES")?.unwrap_or(30) as usize,
            cache_ttl: Duration::from_secs(parse("CACHE_TTL_SECS")?.unwrap_or(6)),
            refresh_interval: Duration::from_secs(parse("REFRESH_INTERVAL_SECS")?.unwrap_or(3)),
            item_timeout: parse("ITEM_TIMEOUT_MS")?.map(Duration::from_millis),
            retry_top_stories: flag("RETRY_TOP_STORIES")?,
            log_to_console: flag("LOG_TO_CONSOLE")?,
        };

        anyhow::ensure!(
            !config.refresh_interval.is_zero(),
            "REFRESH_INTERVAL_SECS must be at least 1"
        );

        Ok(config)
    }

    /// Retry budget for the ranked list request. Kept within one refresh
    /// interval (and the ttl) since a request may wait on it under the cache
    /// lock.
    pub(crate) fn retry_budget(&self) -> Option<Duration> {
        self.retry_top_stories
            .then(|| self.refresh_interval.min(self.cache_ttl))
    }

    pub(crate) fn cache_config(&self) -> crate::cache::CacheConfig {
        crate::cache::CacheConfig {
            num_stories: self.num_stories,
            ttl: self.cache_ttl,
            refresh_interval: self.refresh_interval,
            item_timeout: self.item_timeout,
        }
    }
}
