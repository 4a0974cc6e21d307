// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `DnsProvider`.
//
// ## Behaviour
//
// - One HTTP request per trait call; no retries, no backoff, no caching
//   (the reconciler owns all of that)
// - Every request carries `Authorization: Bearer <token>`
// - Non-success statuses become the operation's error, carrying the status
//   code and reason phrase; create also carries the error body
// - Responses decode into typed shapes; anything else is `Error::Decode`
// - HTTP timeout is configurable (30 seconds by default)
//
// ## Security Requirements
//
// - API token NEVER appears in logs
// - API token is provided via environment variables only
//
// ## API Reference
//
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

pub mod types;

use async_trait::async_trait;
use cfddns_core::config::{Config, RecordType, DEFAULT_API_BASE_URL};
use cfddns_core::traits::{DnsProvider, RecordInfo};
use cfddns_core::{root_domain, Error, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use std::net::IpAddr;
use std::time::Duration;

use types::{ApiResponse, CreatedRecord, DnsRecord, RecordBody, Zone, AUTO_TTL};

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloudflare DNS provider
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API root, without a trailing slash
    base_url: String,

    /// Record type used for lookup, create and patch
    record_type: RecordType,

    /// Proxied flag sent on create and patch
    proxied: bool,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("record_type", &self.record_type)
            .field("proxied", &self.proxied)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `record_type`: Record type to manage (A or AAAA)
    /// - `proxied`: Whether created/patched records are proxied
    /// - `timeout`: Per-request timeout
    ///
    /// An empty token is accepted; the reconciler refuses to run a cycle
    /// without one, so no request is ever sent with it.
    pub fn new(
        api_token: impl Into<String>,
        record_type: RecordType,
        proxied: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token: api_token.into(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            record_type,
            proxied,
            client,
        })
    }

    /// Create a provider from the daemon configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = if config.http_timeout_secs == 0 {
            DEFAULT_HTTP_TIMEOUT
        } else {
            config.http_timeout()
        };

        Ok(Self::new(
            config.api_token.clone(),
            config.record_type,
            config.proxied,
            timeout,
        )?
        .with_base_url(&config.api_base_url))
    }

    /// Point the provider at a different API root
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Start a request with credentials attached
    fn request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
    }

    fn record_body<'a>(&'a self, domain: &'a str, ip: IpAddr) -> RecordBody<'a> {
        RecordBody {
            record_type: self.record_type.as_str(),
            name: domain,
            content: ip.to_string(),
            ttl: AUTO_TTL,
            proxied: self.proxied,
        }
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, zone_id)
    }
}

/// Status code and reason phrase, for error reporting
fn status_parts(status: StatusCode) -> (u16, String) {
    (
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown").to_string(),
    )
}

async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
    request
        .send()
        .await
        .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| Error::decode(format!("Failed to parse Cloudflare response: {}", e)))
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// # API Call
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn resolve_zone(&self, domain: &str) -> Result<String> {
        tracing::debug!("Fetching zone ID for domain: {}", domain);

        let zone_name = root_domain(domain)?;
        let request = self
            .request(Method::GET, format!("{}/zones", self.base_url))
            .query(&[("name", zone_name.as_str())]);
        let response = send(request).await?;

        if !response.status().is_success() {
            let (status, reason) = status_parts(response.status());
            return Err(Error::ZoneLookupFailed { status, reason });
        }

        let body: ApiResponse<Vec<Zone>> = decode(response).await?;
        let zone = body
            .result
            .and_then(|zones| zones.into_iter().next())
            .ok_or(Error::ZoneNotFound { zone: zone_name })?;

        tracing::debug!("Found zone ID: {}", zone.id);
        Ok(zone.id)
    }

    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com&type=A
    /// Authorization: Bearer <token>
    /// ```
    async fn resolve_record(&self, zone_id: &str, domain: &str) -> Result<Option<RecordInfo>> {
        tracing::debug!("Fetching DNS record ID for: {}", domain);

        let request = self
            .request(Method::GET, self.records_url(zone_id))
            .query(&[("name", domain), ("type", self.record_type.as_str())]);
        let response = send(request).await?;

        if !response.status().is_success() {
            let (status, reason) = status_parts(response.status());
            return Err(Error::RecordLookupFailed { status, reason });
        }

        let body: ApiResponse<Vec<DnsRecord>> = decode(response).await?;
        match body.result.and_then(|records| records.into_iter().next()) {
            Some(record) => {
                tracing::debug!(
                    "Found record ID: {} with IP: {}",
                    record.id,
                    record.content
                );
                Ok(Some(RecordInfo {
                    id: record.id,
                    content: record.content,
                }))
            }
            None => {
                tracing::info!(
                    "No {} record found for {}. Will create one.",
                    self.record_type,
                    domain
                );
                Ok(None)
            }
        }
    }

    /// # API Call
    ///
    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// {"type": "A", "name": "...", "content": "1.2.3.4", "ttl": 1, "proxied": true}
    /// ```
    async fn create_record(&self, zone_id: &str, domain: &str, ip: IpAddr) -> Result<String> {
        tracing::info!("Creating DNS record for {} with IP {}...", domain, ip);

        let request = self
            .request(Method::POST, self.records_url(zone_id))
            .json(&self.record_body(domain, ip));
        let response = send(request).await?;

        if !response.status().is_success() {
            let (status, reason) = status_parts(response.status());
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            // Compact JSON when the body parses, raw text otherwise
            let body = serde_json::from_str::<serde_json::Value>(&text)
                .map(|value| value.to_string())
                .unwrap_or(text);
            return Err(Error::RecordCreateFailed {
                status,
                reason,
                body,
            });
        }

        let body: ApiResponse<CreatedRecord> = decode(response).await?;
        let record = body
            .result
            .ok_or_else(|| Error::decode("Create response has no result"))?;

        tracing::info!("DNS record created successfully. Record ID: {}", record.id);
        Ok(record.id)
    }

    /// # API Call
    ///
    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// {"type": "A", "name": "...", "content": "1.2.3.4", "ttl": 1, "proxied": true}
    /// ```
    async fn patch_record(
        &self,
        zone_id: &str,
        record_id: &str,
        domain: &str,
        ip: IpAddr,
    ) -> Result<()> {
        tracing::debug!("Patching {} record {} to {}...", domain, record_id, ip);

        let request = self
            .request(
                Method::PATCH,
                format!("{}/{}", self.records_url(zone_id), record_id),
            )
            .json(&self.record_body(domain, ip));
        let response = send(request).await?;

        if !response.status().is_success() {
            let (status, reason) = status_parts(response.status());
            return Err(Error::RecordPatchFailed { status, reason });
        }

        let text = response.text().await.unwrap_or_default();
        tracing::debug!("Patch successful. Response: {}", text);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
