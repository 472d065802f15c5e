use common::errors::ConfigError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub http_timeout: Duration,
    pub http_max_retries: u32,
    pub store_path: Option<PathBuf>,
    pub dashboard_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build from any variable lookup, so callers are not tied to the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("WEATHER_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("WEATHER_API_KEY"))?;

        Ok(Self {
            api_key,
            api_url: lookup("WEATHER_API_URL")
                .unwrap_or_else(|| "https://api.weatherapi.com/v1".to_string()),
            http_timeout: Duration::from_secs(parse_or(&lookup, "HTTP_TIMEOUT_SECONDS", 10)?),
            http_max_retries: parse_or(&lookup, "HTTP_MAX_RETRIES", 1)?,
            store_path: lookup("WEATHER_STORE_PATH").map(PathBuf::from),
            dashboard_concurrency: parse_or(&lookup, "DASHBOARD_CONCURRENCY", 4)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
