//! Configuration for cfddns
//!
//! Configuration is read once at startup from environment variables and
//! passed explicitly to the reconciler and the clients. Only the credential
//! and the domain are mandatory, and their absence is not a startup error:
//! [`Config::validate`] is called by the reconciler at the top of every
//! cycle, so a missing value is reported on each iteration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable holding the API credential
pub const ENV_API_KEY: &str = "CF_API_KEY";
/// Environment variable holding the fully-qualified domain
pub const ENV_DOMAIN: &str = "CF_DOMAIN";
/// Environment variable holding the record type
pub const ENV_RECORD_TYPE: &str = "CF_DOMAIN_TYPE";
/// Environment variable holding the proxied flag
pub const ENV_PROXIED: &str = "PROXIED";
/// Environment variable holding the poll interval in minutes
pub const ENV_INTERVAL: &str = "INTERVAL";
/// Environment variable holding the log level
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
/// Environment variable holding the public IP endpoint
pub const ENV_PUBLIC_IP_URL: &str = "PUBLIC_IP_URL";
/// Environment variable holding the HTTP timeout in seconds
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
/// Environment variable holding the provider API root
pub const ENV_API_BASE_URL: &str = "CF_API_BASE_URL";

/// Cloudflare API v4 root
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Plaintext "what is my IP" endpoint
pub const DEFAULT_PUBLIC_IP_URL: &str = "http://ipinfo.io/ip";

/// Main cfddns configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// API token sent as a bearer credential (empty = not configured)
    #[serde(default)]
    pub api_token: String,

    /// Fully-qualified domain whose record is managed (empty = not configured)
    #[serde(default)]
    pub domain: String,

    /// Record type used for lookup, create and patch
    #[serde(default)]
    pub record_type: RecordType,

    /// Whether the record is proxied by the provider
    #[serde(default = "default_proxied")]
    pub proxied: bool,

    /// Poll interval in minutes
    #[serde(default = "default_interval_mins")]
    pub interval_mins: u64,

    /// Log level name (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Public IP endpoint
    #[serde(default = "default_public_ip_url")]
    pub public_ip_url: String,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Provider API root
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

// The API token must never reach the logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("record_type", &self.record_type)
            .field("proxied", &self.proxied)
            .field("interval_mins", &self.interval_mins)
            .field("log_level", &self.log_level)
            .field("public_ip_url", &self.public_ip_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl Config {
    /// Create a configuration for the given credential and domain, with defaults
    pub fn new(api_token: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            domain: domain.into(),
            record_type: RecordType::default(),
            proxied: default_proxied(),
            interval_mins: default_interval_mins(),
            log_level: default_log_level(),
            public_ip_url: default_public_ip_url(),
            http_timeout_secs: default_http_timeout_secs(),
            api_base_url: default_api_base_url(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Missing credential or domain are accepted here and reported later by
    /// [`Config::validate`]. Malformed optional values are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::new(
            get(ENV_API_KEY).unwrap_or_default(),
            get(ENV_DOMAIN).unwrap_or_default(),
        );

        if let Some(value) = get(ENV_RECORD_TYPE) {
            config.record_type = value.parse()?;
        }

        config.proxied = parse_proxied(get(ENV_PROXIED).as_deref());

        if let Some(value) = get(ENV_INTERVAL) {
            config.interval_mins = parse_positive(ENV_INTERVAL, &value)?;
        }

        if let Some(value) = get(ENV_LOG_LEVEL) {
            config.log_level = value.to_lowercase();
        }

        if let Some(value) = get(ENV_PUBLIC_IP_URL) {
            config.public_ip_url = value;
        }

        if let Some(value) = get(ENV_HTTP_TIMEOUT_SECS) {
            config.http_timeout_secs = parse_positive(ENV_HTTP_TIMEOUT_SECS, &value)?;
        }

        if let Some(value) = get(ENV_API_BASE_URL) {
            config.api_base_url = value.trim_end_matches('/').to_string();
        }

        // Fail on a bad level now instead of silently logging at the wrong verbosity
        config.tracing_level()?;

        Ok(config)
    }

    /// Check the mandatory settings
    ///
    /// The credential is checked before the domain.
    pub fn validate(&self) -> Result<()> {
        if self.api_token.is_empty() {
            return Err(Error::config(format!("Missing API key ({ENV_API_KEY}).")));
        }
        if self.domain.is_empty() {
            return Err(Error::config(format!("Missing domain ({ENV_DOMAIN}).")));
        }
        Ok(())
    }

    /// Poll interval as a duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_mins.saturating_mul(60))
    }

    /// HTTP timeout as a duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Map the configured log level to a tracing level
    pub fn tracing_level(&self) -> Result<tracing::Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(tracing::Level::TRACE),
            "debug" => Ok(tracing::Level::DEBUG),
            "info" => Ok(tracing::Level::INFO),
            "warn" => Ok(tracing::Level::WARN),
            "error" => Ok(tracing::Level::ERROR),
            other => Err(Error::config(format!(
                "{ENV_LOG_LEVEL} '{other}' is not valid. Valid levels: trace, debug, info, warn, error"
            ))),
        }
    }
}

/// DNS address record type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    #[default]
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            other => Err(Error::config(format!(
                "{ENV_RECORD_TYPE} '{other}' is not supported. Supported types: A, AAAA"
            ))),
        }
    }
}

/// Proxying stays on unless explicitly switched off
fn parse_proxied(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => matches!(v.to_lowercase().as_str(), "true" | "1"),
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::config(format!(
            "{key} must be a positive integer. Got: {value}"
        ))),
    }
}

fn default_proxied() -> bool {
    true
}

fn default_interval_mins() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_public_ip_url() -> String {
    DEFAULT_PUBLIC_IP_URL.to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}
