use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub elasticsearch_url: String,
    /// Per-request timeout for engine calls. A slow backend must never stall
    /// a stats or search request indefinitely.
    pub engine_timeout: Duration,
    pub worker_bin: String,
    pub worker_args: Vec<String>,
    pub seed_file: PathBuf,
    pub status_page_size: usize,
    pub stats_top_domains: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            elasticsearch_url: env::var("ELASTICSEARCH_URL")
                .unwrap_or_else(|_| "http://localhost:9200".to_string()),
            engine_timeout: Duration::from_secs(
                env::var("ENGINE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("ENGINE_TIMEOUT_SECS must be a valid number")?,
            ),
            worker_bin: env::var("CRAWLER_WORKER_BIN")
                .context("CRAWLER_WORKER_BIN must be set")?,
            worker_args: env::var("CRAWLER_WORKER_ARGS")
                .map(|raw| raw.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            seed_file: env::var("SEED_URL_FILE")
                .unwrap_or_else(|_| "seed_urls.json".to_string())
                .into(),
            status_page_size: env::var("STATUS_PAGE_SIZE")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .context("STATUS_PAGE_SIZE must be a valid number")?,
            stats_top_domains: env::var("STATS_TOP_DOMAINS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("STATS_TOP_DOMAINS must be a valid number")?,
        })
    }
}
