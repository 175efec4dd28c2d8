use crate::cache::{Cache, MemoryCache, RedisCache};
use crate::domain::model::BankNoteFilters;
use crate::utils::error::Result;
use crate::utils::validation::{validate_redis_url, validate_url, Validate};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, ValueEnum};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackend {
    /// Process-local cache, lost on restart.
    Memory,
    /// Shared redis cache, survives restarts and is visible across instances.
    Redis,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "euronote")]
#[command(about = "Aggregates euro banknote circulation from the Bank of Finland open data API")]
pub struct CliConfig {
    #[arg(long, default_value = "https://api.boffsaopendata.fi")]
    pub api_base_url: String,

    #[arg(long, help = "Start of the observation range (RFC 3339), default 30 days ago")]
    pub start_period: Option<DateTime<Utc>>,

    #[arg(long, help = "End of the observation range (RFC 3339), default now")]
    pub end_period: Option<DateTime<Utc>>,

    #[arg(long, value_enum, default_value_t = CacheBackend::Memory)]
    pub cache_backend: CacheBackend,

    #[arg(long, default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    #[arg(long, value_delimiter = ',', help = "Restrict conversion to these currency codes")]
    pub currencies: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn filters(&self) -> BankNoteFilters {
        BankNoteFilters {
            start_period: self
                .start_period
                .unwrap_or_else(|| Utc::now() - Duration::days(30)),
            end_period: self.end_period.unwrap_or_else(Utc::now),
        }
    }

    pub fn currency_filter(&self) -> Option<Vec<String>> {
        if self.currencies.is_empty() {
            None
        } else {
            Some(self.currencies.clone())
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_base_url", &self.api_base_url)?;
        if self.cache_backend == CacheBackend::Redis {
            validate_redis_url("redis_url", &self.redis_url)?;
        }
        Ok(())
    }
}

/// Builds the cache backend selected by configuration. The core only ever
/// sees the trait object.
pub async fn build_cache(config: &CliConfig) -> Result<Arc<dyn Cache>> {
    match config.cache_backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryCache::new())),
        CacheBackend::Redis => Ok(Arc::new(RedisCache::connect(&config.redis_url).await?)),
    }
}
