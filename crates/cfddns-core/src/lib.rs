// # cfddns-core
//
// Core library for the cfddns dynamic DNS updater.
//
// ## Architecture Overview
//
// - **IpSource**: Trait for finding the host's public IP
// - **DnsProvider**: Trait for the four record operations (zone lookup,
//   record lookup, create, patch)
// - **Reconciler**: The control loop that keeps one record pointed at the
//   public IP
// - **Config**: Immutable settings read from the environment at startup
//
// ## Design Principles
//
// 1. **One actor**: The reconciler owns all state; nothing is shared
// 2. **Single-shot collaborators**: Providers and IP sources never retry;
//    the next cycle is the retry
// 3. **Errors never stop the loop**: Every cycle failure is logged and the
//    loop sleeps and tries again
// 4. **Library-First**: The daemon is a thin wrapper around this crate

pub mod traits;
pub mod reconciler;
pub mod config;
pub mod domain;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, IpSource, IpVersion, RecordInfo};
pub use reconciler::{CycleOutcome, ReconcileState, Reconciler};
pub use config::{Config, RecordType};
pub use domain::root_domain;
pub use error::{Error, Result};
