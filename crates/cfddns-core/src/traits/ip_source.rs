// # IP Source Trait
//
// Defines the interface for finding out the host's current public IP.
//
// ## Implementations
//
// - Plaintext HTTP endpoint: `cfddns-ip-http` crate

use async_trait::async_trait;
use std::net::IpAddr;

use crate::config::RecordType;

/// IP version (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Version of an address
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }
}

impl From<RecordType> for IpVersion {
    fn from(record_type: RecordType) -> Self {
        match record_type {
            RecordType::A => IpVersion::V4,
            RecordType::Aaaa => IpVersion::V6,
        }
    }
}

/// Trait for IP source implementations
///
/// `current()` is called once per cycle that needs an address. It must
/// return a fresh answer every time; comparing against the last known
/// address is the reconciler's job.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The current IP address
    /// - `Err(Error)`: If the endpoint failed or returned something unusable
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// Get the IP version this source is restricted to
    ///
    /// Returns `None` if any address is accepted.
    fn version(&self) -> Option<IpVersion> {
        None
    }
}
