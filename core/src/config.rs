//! Client configuration.
//!
//! Passed explicitly to `PiwikClient::new`; nothing is read from the
//! environment unless the caller asks for [`ClientConfig::from_env`].

use serde::Deserialize;
use thiserror::Error;

use crate::http::HttpMethod;

/// Token Piwik grants to unauthenticated callers.
pub const ANONYMOUS_TOKEN: &str = "anonymous";

pub const ENV_URL: &str = "PIWIK_URL";
pub const ENV_TOKEN_AUTH: &str = "PIWIK_TOKEN_AUTH";
pub const ENV_HTTP_METHOD: &str = "PIWIK_HTTP_METHOD";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("unsupported HTTP method {0:?}, expected GET or POST")]
    InvalidMethod(String),
}

/// Static settings shared by every call.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// API endpoint, usually ending in `/index.php`.
    pub base_url: String,
    #[serde(default = "default_token_auth")]
    pub token_auth: String,
    #[serde(default)]
    pub method: HttpMethod,
}

fn default_token_auth() -> String {
    ANONYMOUS_TOKEN.to_string()
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token_auth: default_token_auth(),
            method: HttpMethod::default(),
        }
    }

    pub fn with_token_auth(mut self, token_auth: impl Into<String>) -> Self {
        self.token_auth = token_auth.into();
        self
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Read `PIWIK_URL`, `PIWIK_TOKEN_AUTH` and `PIWIK_HTTP_METHOD`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_URL)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingVar(ENV_URL))?;
        let mut config = Self::new(base_url);
        if let Some(token) = lookup(ENV_TOKEN_AUTH).filter(|token| !token.is_empty()) {
            config.token_auth = token;
        }
        if let Some(method) = lookup(ENV_HTTP_METHOD) {
            config.method = match method.to_ascii_uppercase().as_str() {
                "GET" => HttpMethod::Get,
                "POST" => HttpMethod::Post,
                _ => return Err(ConfigError::InvalidMethod(method)),
            };
        }
        Ok(config)
    }
}

// Hand-written so the token never ends up in logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token_auth", &"<redacted>")
            .field("method", &self.method)
            .finish()
    }
}
