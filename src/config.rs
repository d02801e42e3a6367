use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_DATABASE_PATH: &str = "db.sqlite";
pub const DEFAULT_FACT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_FLAG_IMAGE_URL: &str = "https://flagcdn.com/w320/{code}.png";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { name: &'static str, value: String },
}

/// Settings read from the environment (and `.env`, loaded by `main`).
/// The bot token itself is picked up by `Bot::from_env`.
#[derive(Debug, Clone)]
pub struct Config {
    pub chatgpt_api_key: String,
    pub database_path: String,
    pub countries_file: Option<PathBuf>,
    pub fact_timeout: Duration,
    pub flag_image_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let chatgpt_api_key = var("CHATGPT_API_KEY").ok_or(ConfigError::Missing("CHATGPT_API_KEY"))?;

        let fact_timeout = match var("FACT_TIMEOUT_SECS") {
            Some(value) => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidSeconds {
                        name: "FACT_TIMEOUT_SECS",
                        value,
                    })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_FACT_TIMEOUT_SECS),
        };

        Ok(Self {
            chatgpt_api_key,
            database_path: var("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            countries_file: var("COUNTRIES_FILE").map(PathBuf::from),
            fact_timeout,
            flag_image_url: var("FLAG_IMAGE_URL").unwrap_or_else(|| DEFAULT_FLAG_IMAGE_URL.to_string()),
        })
    }
}
