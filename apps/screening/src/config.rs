use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted backend, e.g. `https://xyz.supabase.co`.
    pub service_url: String,
    /// Publishable API key attached to every backend request.
    pub service_key: String,
    /// Timeout applied when the HTTP client is built.
    pub http_timeout: Duration,
    /// Location of the local hint-cache document.
    pub cache_path: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            service_url: require_env("SCREENING_SERVICE_URL")?,
            service_key: require_env("SCREENING_SERVICE_KEY")?,
            http_timeout: Duration::from_secs(
                std::env::var("SCREENING_HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse::<u64>()
                    .context("SCREENING_HTTP_TIMEOUT_SECS must be a number of seconds")?,
            ),
            cache_path: std::env::var("SCREENING_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_cache_path()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Hint cache lives under the platform data dir, falling back to the
/// working directory when none is known.
fn default_cache_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("screening")
        .join("hints.json")
}
