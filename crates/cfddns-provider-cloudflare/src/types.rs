//! Cloudflare API v4 request and response shapes

use serde::{Deserialize, Serialize};

/// TTL value Cloudflare treats as "automatic"
pub const AUTO_TTL: u32 = 1;

/// Common response envelope
///
/// `result` is absent or null on most error responses.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
}

/// Zone entry from `GET /zones`
#[derive(Debug, Deserialize)]
pub struct Zone {
    pub id: String,
}

/// DNS record entry from `GET /zones/:zone_id/dns_records`
#[derive(Debug, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub content: String,
}

/// Result of `POST /zones/:zone_id/dns_records`
#[derive(Debug, Deserialize)]
pub struct CreatedRecord {
    pub id: String,
}

/// Body for record create and patch
///
/// Patch sends every field too, so the record ends up in the same shape no
/// matter how it was last edited.
#[derive(Debug, Serialize)]
pub struct RecordBody<'a> {
    #[serde(rename = "type")]
    pub record_type: &'a str,
    pub name: &'a str,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
}
