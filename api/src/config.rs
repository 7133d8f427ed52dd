//! Process configuration, read once at startup
//!
//! Every external credential gates startup: a missing X key/secret or Apify
//! token aborts the process instead of failing each request later.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::constants::{
    APIFY_BASE_URL, DEFAULT_ORCHESTRATOR_TIMEOUT_SECS, DEFAULT_PORT,
    DEFAULT_UPSTREAM_TIMEOUT_SECS, X_API_BASE_URL,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Clone)]
pub struct Config {
    pub x_api_key: String,
    pub x_api_secret: String,
    pub apify_token: String,
    /// Pre-provisioned app bearer token; skips the first exchange when set
    pub x_bearer_token: Option<String>,
    pub bind_addr: String,
    pub port: u16,
    pub upstream_timeout: Duration,
    pub orchestrator_timeout: Duration,
    pub x_api_base_url: String,
    pub apify_base_url: String,
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        check_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let required = |var: &'static str| non_empty(var).ok_or(ConfigError::Missing(var));

        let x_api_key = required("X_API_KEY")?;
        let x_api_secret = required("X_API_SECRET")?;
        let apify_token = required("APIFY_API_TOKEN")?;

        let port = match non_empty("PORT") {
            Some(raw) => parse_var("PORT", &raw)?,
            None => DEFAULT_PORT,
        };
        let upstream_timeout_secs = match non_empty("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => parse_var("UPSTREAM_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };
        let orchestrator_timeout_secs = match non_empty("ORCHESTRATOR_TIMEOUT_SECS") {
            Some(raw) => parse_var("ORCHESTRATOR_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_ORCHESTRATOR_TIMEOUT_SECS,
        };

        Ok(Self {
            x_api_key,
            x_api_secret,
            apify_token,
            x_bearer_token: non_empty("X_BEARER_TOKEN"),
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
            orchestrator_timeout: Duration::from_secs(orchestrator_timeout_secs),
            x_api_base_url: non_empty("X_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| X_API_BASE_URL.to_string()),
            apify_base_url: non_empty("APIFY_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| APIFY_BASE_URL.to_string()),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = parse_var("BIND_ADDR", &self.bind_addr)?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// A missing `.env` is fine; one that exists but does not parse is not.
fn check_dotenv<T>(loaded: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::Invalid {
            var: ".env",
            reason: e.to_string(),
        }),
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

// Secrets stay out of logs and panic messages
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("x_api_key", &"<redacted>")
            .field("x_api_secret", &"<redacted>")
            .field("apify_token", &"<redacted>")
            .field("x_bearer_token", &self.x_bearer_token.as_ref().map(|_| "<redacted>"))
            .field("bind_addr", &self.bind_addr)
            .field("port", &self.port)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("orchestrator_timeout", &self.orchestrator_timeout)
            .field("x_api_base_url", &self.x_api_base_url)
            .field("apify_base_url", &self.apify_base_url)
            .finish()
    }
}
