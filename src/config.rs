//! read client configuration from a file, the environment, or explicit values

use std::path::Path;
use std::time::Duration;

use crate::errors::Error;

fn default_refresh_path() -> String {
    "/refresh".to_string()
}

fn default_token_field() -> String {
    "token".to_string()
}

fn default_logout_path() -> String {
    "/auth/logout".to_string()
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    pub base_url: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Field of the refresh response body holding the new bearer token.
    #[serde(default = "default_token_field")]
    pub token_field: String,
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
    /// Per-request timeout in milliseconds.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Config {
    pub fn from_values(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            refresh_path: default_refresh_path(),
            token_field: default_token_field(),
            logout_path: default_logout_path(),
            request_timeout_ms: None,
            user_agent: None,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// # ENV Vars
    /// * `SESSION_FETCH_BASE_URL` - Base URL of the REST backend (required)
    /// * `SESSION_FETCH_REFRESH_PATH` - Path of the refresh endpoint
    /// * `SESSION_FETCH_TOKEN_FIELD` - Token field in the refresh response
    /// * `SESSION_FETCH_LOGOUT_PATH` - Path of the logout endpoint
    /// * `SESSION_FETCH_TIMEOUT_MS` - Per-request timeout in milliseconds
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading each variable through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let base_url = lookup("SESSION_FETCH_BASE_URL")
            .ok_or_else(|| Error::Config("Missing SESSION_FETCH_BASE_URL env var".to_string()))?;
        let mut config = Config::from_values(base_url);
        if let Some(path) = lookup("SESSION_FETCH_REFRESH_PATH") {
            config.refresh_path = path;
        }
        if let Some(field) = lookup("SESSION_FETCH_TOKEN_FIELD") {
            config.token_field = field;
        }
        if let Some(path) = lookup("SESSION_FETCH_LOGOUT_PATH") {
            config.logout_path = path;
        }
        if let Some(ms) = lookup("SESSION_FETCH_TIMEOUT_MS") {
            let ms = ms.parse().map_err(|_| {
                Error::Config(format!("SESSION_FETCH_TIMEOUT_MS is not a number: '{ms}'"))
            })?;
            config.request_timeout_ms = Some(ms);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn with_token_field(mut self, field: impl Into<String>) -> Self {
        self.token_field = field.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        reqwest::Url::parse(&self.base_url).map_err(|e| {
            Error::Config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        for (name, path) in [
            ("refresh_path", &self.refresh_path),
            ("logout_path", &self.logout_path),
        ] {
            if !path.starts_with('/') {
                return Err(Error::Config(format!("{name} must start with '/': '{path}'")));
            }
        }
        if self.token_field.is_empty() {
            return Err(Error::Config("token_field must not be empty".to_string()));
        }
        if self.request_timeout_ms == Some(0) {
            return Err(Error::Config("request_timeout_ms must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Joins the base URL and an endpoint path with exactly one slash.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn refresh_url(&self) -> String {
        self.endpoint_url(&self.refresh_path)
    }
}
