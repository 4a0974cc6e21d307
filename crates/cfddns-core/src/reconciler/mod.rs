//! Reconciliation loop
//!
//! The Reconciler is responsible for:
//! - Resolving the zone and record IDs once and caching them
//! - Creating the record when the provider has none
//! - Fetching the public IP every cycle and patching the record on change
//! - Sleeping between cycles until shutdown
//!
//! ## Cycle
//!
//! ```text
//!  config ok? ──no──► Error::Config
//!      │
//!  zone known? ──no──► resolve_zone ──► cache zone id
//!      │
//!  record known? ──no──► resolve_record
//!      │                    ├─ found ──► cache id + content
//!      │                    └─ absent ─► fetch IP ─► create ─► Created (cycle ends)
//!      ▼
//!  fetch IP ── same as cached ──► Unchanged
//!      └────── different ───────► patch ─► Updated
//! ```
//!
//! A failing step ends the cycle with its error. Whatever was cached before
//! the failure stays cached, so the next cycle resumes where this one broke.

use crate::config::Config;
use crate::error::Result;
use crate::traits::{DnsProvider, IpSource};
use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, error, info};

/// What a successful cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No record existed; one was created pointing at `ip`
    Created {
        record_id: String,
        ip: IpAddr,
    },

    /// The public IP changed and the record was patched
    Updated {
        previous_ip: Option<IpAddr>,
        new_ip: IpAddr,
    },

    /// The public IP matches the cached one; nothing was written
    Unchanged {
        current_ip: IpAddr,
    },
}

/// State the reconciler keeps for the lifetime of the process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileState {
    /// Zone ID, set by the first successful zone lookup
    pub zone_id: Option<String>,

    /// Record ID, set by the first successful record lookup or create
    pub record_id: Option<String>,

    /// Address the record is believed to hold
    pub cached_ip: Option<IpAddr>,
}

/// Keeps one DNS record pointed at the host's public IP
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Start with [`Reconciler::run()`] or [`Reconciler::run_with_shutdown()`]
/// 3. The loop runs until the shutdown signal fires
///
/// Single cycles can be driven directly with [`Reconciler::reconcile_once()`].
pub struct Reconciler {
    /// Immutable settings read at startup
    config: Config,

    /// DNS provider for record lookups and writes
    provider: Box<dyn DnsProvider>,

    /// Public IP source
    ip_source: Box<dyn IpSource>,

    /// Sleep between cycles
    interval: Duration,

    /// Cached identifiers and last known IP
    state: ReconcileState,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// The configuration is not validated here; a missing credential or
    /// domain is reported by every cycle instead.
    pub fn new(
        config: Config,
        provider: Box<dyn DnsProvider>,
        ip_source: Box<dyn IpSource>,
    ) -> Self {
        let interval = config.interval();

        Self {
            config,
            provider,
            ip_source,
            interval,
            state: ReconcileState::default(),
        }
    }

    /// Override the sleep between cycles
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sleep between cycles
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Cached identifiers and last known IP
    pub fn state(&self) -> &ReconcileState {
        &self.state
    }

    /// Run a single reconciliation cycle
    pub async fn reconcile_once(&mut self) -> Result<CycleOutcome> {
        self.config.validate()?;
        let domain = self.config.domain.clone();

        let zone_id = match &self.state.zone_id {
            Some(zone_id) => zone_id.clone(),
            None => {
                let zone_id = self.provider.resolve_zone(&domain).await?;
                debug!("Cached zone ID {} for {}", zone_id, domain);
                self.state.zone_id = Some(zone_id.clone());
                zone_id
            }
        };

        let record_id = match &self.state.record_id {
            Some(record_id) => record_id.clone(),
            None => match self.provider.resolve_record(&zone_id, &domain).await? {
                Some(record) => {
                    self.state.cached_ip = match record.content.trim().parse::<IpAddr>() {
                        Ok(ip) => Some(ip),
                        Err(_) => {
                            debug!(
                                "Record content '{}' is not an IP address, will overwrite it",
                                record.content
                            );
                            None
                        }
                    };
                    self.state.record_id = Some(record.id.clone());
                    record.id
                }
                None => {
                    let ip = self.ip_source.current().await?;
                    let record_id = self.provider.create_record(&zone_id, &domain, ip).await?;

                    self.state.record_id = Some(record_id.clone());
                    self.state.cached_ip = Some(ip);
                    info!("Initial DNS record created successfully.");

                    // Skip the comparison: the record was just written with this IP
                    return Ok(CycleOutcome::Created { record_id, ip });
                }
            },
        };

        let public_ip = self.ip_source.current().await?;

        if self.state.cached_ip == Some(public_ip) {
            debug!("Record {} already has IP {}, skipping update", domain, public_ip);
            return Ok(CycleOutcome::Unchanged {
                current_ip: public_ip,
            });
        }

        info!(
            "Public IP changed ({} -> {}). Updating {} record via {}...",
            self.state
                .cached_ip
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            public_ip,
            domain,
            self.provider.provider_name()
        );

        self.provider
            .patch_record(&zone_id, &record_id, &domain, public_ip)
            .await?;
        let previous_ip = self.state.cached_ip.replace(public_ip);
        info!("DNS record updated: {} -> {}", domain, public_ip);

        Ok(CycleOutcome::Updated {
            previous_ip,
            new_ip: public_ip,
        })
    }

    /// Run the loop until Ctrl-C
    pub async fn run(&mut self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;
    }

    /// Run the loop until `shutdown_rx` fires
    ///
    /// Dropping the sender also stops the loop.
    pub async fn run_with_shutdown(&mut self, shutdown_rx: tokio::sync::oneshot::Receiver<()>) {
        self.run_until(async {
            let _ = shutdown_rx.await;
        })
        .await;
    }

    /// Run the loop until `shutdown` completes
    ///
    /// Cycle errors are logged and never end the loop. The shutdown future
    /// is raced against both the cycle and the sleep that follows it.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Reconciler started for {} (interval: {:?})",
            self.config.domain, self.interval
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                result = self.reconcile_once() => match result {
                    Ok(outcome) => debug!("Cycle finished: {:?}", outcome),
                    Err(e) => error!("{}", e),
                },
            }

            debug!("Starting sleep...");
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => debug!("Waking up..."),
            }
        }

        info!("Shutdown signal received, reconciler stopped");
    }
}
