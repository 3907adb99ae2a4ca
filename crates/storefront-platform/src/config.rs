use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_SEARCH_TEXT_CONFIG: &str = "simple";
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;
const DEFAULT_WEBHOOK_RESPONSE_LIMIT: usize = 1024;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: String,
    pub http_addr: String,
    /// Postgres text search configuration used for `search_vector`.
    pub search_text_config: String,
    pub webhook_timeout: Duration,
    pub webhook_response_limit: usize,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), default_http_addr)
    }

    pub fn worker_from_env() -> Result<Self> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok(), "")?;
        config.http_addr = String::new();
        Ok(config)
    }

    pub fn from_lookup<F>(lookup: F, default_http_addr: &str) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is required")?;
        let redis_url = lookup("REDIS_URL").context("REDIS_URL is required")?;
        let http_addr = lookup("HTTP_ADDR").unwrap_or_else(|| default_http_addr.to_string());
        let search_text_config = lookup("SEARCH_TEXT_CONFIG")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SEARCH_TEXT_CONFIG.to_string());

        let database_max_connections =
            parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS)?;
        let webhook_timeout_secs =
            parse_or(&lookup, "WEBHOOK_TIMEOUT_SECS", DEFAULT_WEBHOOK_TIMEOUT_SECS)?;
        let webhook_response_limit =
            parse_or(&lookup, "WEBHOOK_RESPONSE_LIMIT", DEFAULT_WEBHOOK_RESPONSE_LIMIT)?;

        Ok(Self {
            database_url,
            database_max_connections,
            redis_url,
            http_addr,
            search_text_config,
            webhook_timeout: Duration::from_secs(webhook_timeout_secs),
            webhook_response_limit,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got '{raw}'")),
        None => Ok(default),
    }
}
