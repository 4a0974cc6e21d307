// # HTTP IP Source
//
// This crate provides the plaintext-HTTP IP source for cfddns.
//
// ## Behaviour
//
// Issues one GET per call against an endpoint that answers with the caller's
// address as the whole response body (e.g. `http://ipinfo.io/ip`). The body
// is trimmed and parsed; nothing is cached between calls.
//
// When the source is restricted to one IP version (derived from the record
// type), an address of the other family is rejected rather than written
// into a record that cannot hold it.

use cfddns_core::config::Config;
use cfddns_core::traits::{IpSource, IpVersion};
use cfddns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// HTTP-based public IP source
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// IP version to accept (None = any)
    version: Option<IpVersion>,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "http://ipinfo.io/ip")
    /// - `version`: IP version to accept (None = both)
    /// - `timeout`: Per-request timeout
    pub fn new(url: impl Into<String>, version: Option<IpVersion>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            version,
            client,
        })
    }

    /// Create a source for the configured endpoint, restricted to the
    /// family the configured record type holds
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.public_ip_url.clone(),
            Some(IpVersion::from(config.record_type)),
            config.http_timeout(),
        )
    }

    /// Endpoint this source queries
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        tracing::debug!("Fetching public IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::PublicIpFetchFailed {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;
        let ip_text = ip_text.trim();

        let ip: IpAddr = ip_text
            .parse()
            .map_err(|_| Error::decode(format!("Invalid IP address: {}", ip_text)))?;

        if let Some(expected) = self.version
            && IpVersion::of(&ip) != expected
        {
            return Err(Error::decode(format!(
                "Expected {:?} address, got: {}",
                expected, ip
            )));
        }

        tracing::debug!("Public IP is {}", ip);
        Ok(ip)
    }

    fn version(&self) -> Option<IpVersion> {
        self.version
    }
}
