//! Runtime settings, read from the environment (and an optional `.env` file).

use std::{env, fmt::Display, str::FromStr};

use anyhow::{anyhow, Result};
use log::{info, LevelFilter};

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_DATABASE_URL: &str = "trivia.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub database_url: String,
    pub pool_size: u32,
    pub log_level: LevelFilter,
    pub seed_categories: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            bind: try_load("TRIVIA_BIND", DEFAULT_BIND)?,
            database_url: try_load("TRIVIA_DATABASE_URL", DEFAULT_DATABASE_URL)?,
            pool_size: try_load("TRIVIA_POOL_SIZE", "4")?,
            log_level: try_load("TRIVIA_LOG_LEVEL", "info")?,
            seed_categories: try_load("TRIVIA_SEED_CATEGORIES", "true")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_owned(),
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            pool_size: 4,
            log_level: LevelFilter::Info,
            seed_categories: true,
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    parse_value(key, env::var(key).ok(), default)
}

fn parse_value<T: FromStr>(key: &str, raw: Option<String>, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = raw.unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_owned()
    });

    raw.trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value {raw:?}: {e}"))
}
