use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_body_size: usize,
}

/// Connection to the external recipe store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub bootstrap_concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub max_query_ingredients: usize,
    pub event_queue_capacity: usize,
}

/// Read an environment variable, falling back to `default` when unset
fn env_or<T: FromStr>(name: &str, default: &str) -> Result<T> {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {name} value")))
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_or("PORT", "3000")?;
        let max_request_body_size = env_or("MAX_REQUEST_BODY_SIZE", "65536")?;

        let base_url = std::env::var("RECIPE_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let api_token = std::env::var("RECIPE_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        let timeout_seconds = env_or("RECIPE_API_TIMEOUT", "30")?;
        let bootstrap_concurrency = env_or("BOOTSTRAP_CONCURRENCY", "8")?;

        let max_query_ingredients = env_or("MAX_QUERY_INGREDIENTS", "50")?;
        let event_queue_capacity = env_or("EVENT_QUEUE_CAPACITY", "1024")?;

        Ok(Settings {
            server: ServerConfig {
                host,
                port,
                max_request_body_size,
            },
            store: StoreConfig {
                base_url,
                api_token,
                timeout_seconds,
                user_agent: format!("Frigo/{}", env!("CARGO_PKG_VERSION")),
                bootstrap_concurrency,
            },
            matching: MatchingConfig {
                max_query_ingredients,
                event_queue_capacity,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        url::Url::parse(&self.store.base_url)
            .map_err(|e| Error::Config(format!("Invalid RECIPE_API_URL: {e}")))?;

        if self.store.timeout_seconds == 0 {
            return Err(Error::Config("Recipe store timeout must be non-zero".to_string()));
        }

        if self.store.bootstrap_concurrency == 0 {
            return Err(Error::Config(
                "Bootstrap concurrency must be non-zero".to_string(),
            ));
        }

        if self.matching.max_query_ingredients == 0 {
            return Err(Error::Config(
                "Maximum query ingredients must be non-zero".to_string(),
            ));
        }

        if self.matching.event_queue_capacity == 0 {
            return Err(Error::Config("Event queue capacity must be non-zero".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_request_body_size: 65536,
        },
        store: StoreConfig {
            base_url: "http://localhost:8000".to_string(),
            api_token: None,
            timeout_seconds: 5,
            user_agent: "test".to_string(),
            bootstrap_concurrency: 4,
        },
        matching: MatchingConfig {
            max_query_ingredients: 50,
            event_queue_capacity: 16,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_validation() {
        let mut settings = test_settings();
        assert!(settings.validate().is_ok());

        settings.server.port = 0;
        assert!(settings.validate().is_err());

        let mut settings = test_settings();
        settings.store.base_url = "not a url".to_string();
        assert!(settings.validate().is_err());

        let mut settings = test_settings();
        settings.store.bootstrap_concurrency = 0;
        assert!(settings.validate().is_err());

        let mut settings = test_settings();
        settings.matching.max_query_ingredients = 0;
        assert!(settings.validate().is_err());
    }
}
