// # DNS Provider Trait
//
// Defines the interface the reconciler uses to read and write the managed
// record.
//
// ## Implementations
//
// - Cloudflare: `cfddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use cfddns_core::DnsProvider;
//
// let zone_id = provider.resolve_zone("home.example.com").await?;
// match provider.resolve_record(&zone_id, "home.example.com").await? {
//     Some(record) => println!("{} -> {}", record.id, record.content),
//     None => {
//         provider.create_record(&zone_id, "home.example.com", ip).await?;
//     }
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// A DNS record as returned by a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInfo {
    /// The record ID (provider-specific)
    pub id: String,
    /// The record content (the address currently published)
    pub content: String,
}

/// Trait for DNS provider implementations
///
/// Each method performs exactly one request/response exchange. Providers
/// do not retry, sleep, or cache: the reconciler owns all of that and
/// simply calls again on its next cycle.
///
/// Record type, TTL and proxy settings are fixed when the provider is
/// constructed; the methods only carry what changes between calls.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Find the zone that contains `domain`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The zone ID
    /// - `Err(Error::ZoneLookupFailed)`: Non-success response
    /// - `Err(Error::ZoneNotFound)`: No zone matched the root domain
    async fn resolve_zone(&self, domain: &str) -> Result<String, crate::Error>;

    /// Look up the address record for `domain` in a zone
    ///
    /// # Returns
    ///
    /// - `Ok(Some(RecordInfo))`: The first matching record
    /// - `Ok(None)`: No such record (the caller should create one)
    /// - `Err(Error::RecordLookupFailed)`: Non-success response
    async fn resolve_record(
        &self,
        zone_id: &str,
        domain: &str,
    ) -> Result<Option<RecordInfo>, crate::Error>;

    /// Create the address record pointing at `ip`
    ///
    /// # Returns
    ///
    /// The new record ID
    async fn create_record(
        &self,
        zone_id: &str,
        domain: &str,
        ip: IpAddr,
    ) -> Result<String, crate::Error>;

    /// Overwrite an existing record so it points at `ip`
    ///
    /// Sends every field, so re-applying the same address is harmless.
    async fn patch_record(
        &self,
        zone_id: &str,
        record_id: &str,
        domain: &str,
        ip: IpAddr,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging)
    fn provider_name(&self) -> &'static str;
}
