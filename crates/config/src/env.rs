use herdbook_common::error::{HerdbookError, HerdbookResult};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    pub recompute_interval_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads required vars.
    pub fn from_env() -> HerdbookResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: get_var("DATABASE_URL")?,
            log_level: get_var_or("LOG_LEVEL", "info"),
            recompute_interval_secs: get_var_or("RECOMPUTE_INTERVAL_SECS", "3600")
                .parse()
                .map_err(|e| {
                    HerdbookError::Config(format!("invalid RECOMPUTE_INTERVAL_SECS: {e}"))
                })?,
        })
    }
}

fn get_var(key: &str) -> HerdbookResult<String> {
    env::var(key).map_err(|_| HerdbookError::Config(format!("{key} is required but not set")))
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
