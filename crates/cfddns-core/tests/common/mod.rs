//! Test doubles and common utilities for reconciler contract tests
//!
//! The doubles are cheap to clone and every clone shares the same script
//! and call log, so a test can hand one clone to the reconciler and keep
//! another to steer and inspect it.

#![allow(dead_code)]

use cfddns_core::error::{Error, Result};
use cfddns_core::traits::{DnsProvider, IpSource, RecordInfo};
use cfddns_core::Config;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// A provider call, as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ResolveZone {
        domain: String,
    },
    ResolveRecord {
        zone_id: String,
        domain: String,
    },
    Create {
        zone_id: String,
        domain: String,
        ip: IpAddr,
    },
    Patch {
        zone_id: String,
        record_id: String,
        domain: String,
        ip: IpAddr,
    },
}

struct ProviderScript {
    zone_id: Option<String>,
    record: Option<RecordInfo>,
    next_record_id: String,
    zone_failures: VecDeque<Error>,
    lookup_failures: VecDeque<Error>,
    create_failures: VecDeque<Error>,
    patch_failures: VecDeque<Error>,
    calls: Vec<ProviderCall>,
}

/// A scripted DnsProvider that records every call
#[derive(Clone)]
pub struct MockDnsProvider {
    script: Arc<Mutex<ProviderScript>>,
}

impl MockDnsProvider {
    /// Provider with zone `zone_id` and no record yet
    pub fn new(zone_id: &str) -> Self {
        Self {
            script: Arc::new(Mutex::new(ProviderScript {
                zone_id: Some(zone_id.to_string()),
                record: None,
                next_record_id: "R1".to_string(),
                zone_failures: VecDeque::new(),
                lookup_failures: VecDeque::new(),
                create_failures: VecDeque::new(),
                patch_failures: VecDeque::new(),
                calls: Vec::new(),
            })),
        }
    }

    /// Provider whose zone lookup matches nothing
    pub fn without_zone() -> Self {
        let provider = Self::new("unused");
        provider.script.lock().unwrap().zone_id = None;
        provider
    }

    /// Make the record lookup find an existing record
    pub fn with_record(self, id: &str, content: &str) -> Self {
        self.script.lock().unwrap().record = Some(RecordInfo {
            id: id.to_string(),
            content: content.to_string(),
        });
        self
    }

    pub fn fail_next_zone_lookup(&self, error: Error) {
        self.script.lock().unwrap().zone_failures.push_back(error);
    }

    pub fn fail_next_record_lookup(&self, error: Error) {
        self.script.lock().unwrap().lookup_failures.push_back(error);
    }

    pub fn fail_next_create(&self, error: Error) {
        self.script.lock().unwrap().create_failures.push_back(error);
    }

    pub fn fail_next_patch(&self, error: Error) {
        self.script.lock().unwrap().patch_failures.push_back(error);
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn zone_lookup_count(&self) -> usize {
        self.count(|call| matches!(call, ProviderCall::ResolveZone { .. }))
    }

    pub fn record_lookup_count(&self) -> usize {
        self.count(|call| matches!(call, ProviderCall::ResolveRecord { .. }))
    }

    /// Addresses sent by create calls
    pub fn created_ips(&self) -> Vec<IpAddr> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProviderCall::Create { ip, .. } => Some(ip),
                _ => None,
            })
            .collect()
    }

    /// Addresses sent by patch calls
    pub fn patched_ips(&self) -> Vec<IpAddr> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProviderCall::Patch { ip, .. } => Some(ip),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&ProviderCall) -> bool) -> usize {
        self.script
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| pred(call))
            .count()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn resolve_zone(&self, domain: &str) -> Result<String> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(ProviderCall::ResolveZone {
            domain: domain.to_string(),
        });

        if let Some(error) = script.zone_failures.pop_front() {
            return Err(error);
        }

        script.zone_id.clone().ok_or_else(|| Error::ZoneNotFound {
            zone: cfddns_core::root_domain(domain).unwrap_or_default(),
        })
    }

    async fn resolve_record(&self, zone_id: &str, domain: &str) -> Result<Option<RecordInfo>> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(ProviderCall::ResolveRecord {
            zone_id: zone_id.to_string(),
            domain: domain.to_string(),
        });

        if let Some(error) = script.lookup_failures.pop_front() {
            return Err(error);
        }

        Ok(script.record.clone())
    }

    async fn create_record(&self, zone_id: &str, domain: &str, ip: IpAddr) -> Result<String> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(ProviderCall::Create {
            zone_id: zone_id.to_string(),
            domain: domain.to_string(),
            ip,
        });

        if let Some(error) = script.create_failures.pop_front() {
            return Err(error);
        }

        let id = script.next_record_id.clone();
        script.record = Some(RecordInfo {
            id: id.clone(),
            content: ip.to_string(),
        });
        Ok(id)
    }

    async fn patch_record(
        &self,
        zone_id: &str,
        record_id: &str,
        domain: &str,
        ip: IpAddr,
    ) -> Result<()> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(ProviderCall::Patch {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            domain: domain.to_string(),
            ip,
        });

        if let Some(error) = script.patch_failures.pop_front() {
            return Err(error);
        }

        if let Some(record) = script.record.as_mut() {
            record.content = ip.to_string();
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

struct IpScript {
    current: IpAddr,
    failures: VecDeque<Error>,
    calls: usize,
}

/// An IpSource whose answer the test controls
#[derive(Clone)]
pub struct ControlledIpSource {
    script: Arc<Mutex<IpScript>>,
}

impl ControlledIpSource {
    pub fn new(current: IpAddr) -> Self {
        Self {
            script: Arc::new(Mutex::new(IpScript {
                current,
                failures: VecDeque::new(),
                calls: 0,
            })),
        }
    }

    /// Change the address returned from now on
    pub fn set_ip(&self, ip: IpAddr) {
        self.script.lock().unwrap().current = ip;
    }

    pub fn fail_next(&self, error: Error) {
        self.script.lock().unwrap().failures.push_back(error);
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.script.lock().unwrap().calls
    }
}

#[async_trait::async_trait]
impl IpSource for ControlledIpSource {
    async fn current(&self) -> Result<IpAddr> {
        let mut script = self.script.lock().unwrap();
        script.calls += 1;

        if let Some(error) = script.failures.pop_front() {
            return Err(error);
        }

        Ok(script.current)
    }
}

/// Helper to create a complete Config for testing
pub fn test_config(domain: &str) -> Config {
    Config::new("test-token", domain)
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

/// A representative non-success response error
pub fn server_error_zone() -> Error {
    Error::ZoneLookupFailed {
        status: 500,
        reason: "Internal Server Error".to_string(),
    }
}
