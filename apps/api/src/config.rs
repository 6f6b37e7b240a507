use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::embedding::client::{DEFAULT_API_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Everything has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent means the in-memory store.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Absent means every embedding call fails as unavailable.
    pub embedding_api_key: Option<String>,
    pub embedding_api_url: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub embedding_max_concurrency: usize,
    pub embedding_timeout: Duration,
    pub embedding_degraded_mode: bool,
    pub vocabulary_path: Option<PathBuf>,
    pub search_candidate_pool: usize,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            port: 8080,
            rust_log: "info".to_string(),
            embedding_api_key: None,
            embedding_api_url: DEFAULT_API_URL.to_string(),
            embedding_model: DEFAULT_MODEL.to_string(),
            embedding_dimension: 1536,
            embedding_max_concurrency: 8,
            embedding_timeout: Duration::from_secs(30),
            embedding_degraded_mode: false,
            vocabulary_path: None,
            search_candidate_pool: 50,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_api_url: optional_env("EMBEDDING_API_URL")
                .unwrap_or(defaults.embedding_api_url),
            embedding_model: optional_env("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_dimension: parse_env("EMBEDDING_DIMENSION", defaults.embedding_dimension)?,
            embedding_max_concurrency: parse_env(
                "EMBEDDING_MAX_CONCURRENCY",
                defaults.embedding_max_concurrency,
            )?,
            embedding_timeout: Duration::from_secs(parse_env(
                "EMBEDDING_TIMEOUT_SECS",
                defaults.embedding_timeout.as_secs(),
            )?),
            embedding_degraded_mode: parse_env(
                "EMBEDDING_DEGRADED_MODE",
                defaults.embedding_degraded_mode,
            )?,
            vocabulary_path: optional_env("VOCABULARY_PATH").map(PathBuf::from),
            search_candidate_pool: parse_env(
                "SEARCH_CANDIDATE_POOL",
                defaults.search_candidate_pool,
            )?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        })
    }
}

/// Set and non-blank, else `None`.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}
