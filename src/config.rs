use dotenvy::dotenv;
use once_cell::sync::Lazy;
use reqwest::Url;
use std::env;

pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_LOG_FILTER: &str = "info";

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        ws_url: get_env_or_default("SEARCH_AGENT_WS_URL", DEFAULT_WS_URL),
        api_url: get_env_or_default("SEARCH_AGENT_API_URL", DEFAULT_API_URL),
        log_filter: get_env_or_default("SEARCH_AGENT_LOG", DEFAULT_LOG_FILTER),
    }
});

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name} {value:?}: {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// WebSocket endpoint of the search backend.
    pub ws_url: String,
    /// Base URL of the persistence API.
    pub api_url: String,
    pub log_filter: String,
}

impl Config {
    pub fn new(ws_url: impl Into<String>, api_url: impl Into<String>) -> Config {
        Config {
            ws_url: ws_url.into(),
            api_url: api_url.into(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("SEARCH_AGENT_WS_URL", &self.ws_url, &["ws", "wss"])?;
        check_url("SEARCH_AGENT_API_URL", &self.api_url, &["http", "https"])?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_WS_URL, DEFAULT_API_URL)
    }
}

fn check_url(name: &'static str, value: &str, schemes: &[&str]) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if !schemes.contains(&url.scheme()) {
        return Err(invalid(format!("expected scheme {}", schemes.join(" or "))));
    }
    Ok(())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[test]
fn test_validate() {
    assert!(Config::default().validate().is_ok());
    assert!(Config::new("http://localhost:8000/ws", DEFAULT_API_URL).validate().is_err());
    assert!(Config::new(DEFAULT_WS_URL, "not a url").validate().is_err());
}
