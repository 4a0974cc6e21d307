//! Core traits for cfddns
//!
//! - [`IpSource`]: Find the host's public IP
//! - [`DnsProvider`]: Read and write the managed DNS record

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, IpVersion};
pub use dns_provider::{DnsProvider, RecordInfo};
