use reqwest::Url;
use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be an absolute URL, got {value:?}")]
    InvalidUrl { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub prefs_path: PathBuf,
    pub student_api_url: Url,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub notice_ttl: Duration,
    pub login_path: String,
    pub back_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("STUDENT_API_URL").unwrap_or_else(|| "http://127.0.0.1:3000".to_string());
        let student_api_url = Url::parse(&api_url).map_err(|_| ConfigError::InvalidUrl {
            name: "STUDENT_API_URL",
            value: api_url.clone(),
        })?;

        Ok(Self {
            port: number(&lookup, "PORT", 8080)?,
            prefs_path: lookup("SCAN_DESK_PREFS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/preferences.json")),
            student_api_url,
            poll_interval: Duration::from_secs(number(&lookup, "SCAN_DESK_POLL_SECS", 5)?),
            request_timeout: Duration::from_secs(number(
                &lookup,
                "SCAN_DESK_REQUEST_TIMEOUT_SECS",
                10,
            )?),
            notice_ttl: Duration::from_secs(number(&lookup, "SCAN_DESK_NOTICE_SECS", 5)?),
            login_path: lookup("SCAN_DESK_LOGIN_PATH").unwrap_or_else(|| "/".to_string()),
            back_path: lookup("SCAN_DESK_BACK_PATH").unwrap_or_else(|| "/dashboard".to_string()),
        })
    }
}

fn number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}
