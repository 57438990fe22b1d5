use std::str::FromStr;

use anyhow::Context;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub addr: String,
    pub static_dir: String,
    pub session_minutes: i64,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        Ok(Config {
            database_url: dotenv::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            addr: dotenv::var("WARBLER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned()),
            static_dir: dotenv::var("WARBLER_STATIC_DIR").unwrap_or_else(|_| "static".to_owned()),
            session_minutes: var_or("WARBLER_SESSION_MINUTES", 60)?,
            max_connections: var_or("WARBLER_MAX_CONNECTIONS", 16)?,
        })
    }
}

fn var_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match dotenv::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
