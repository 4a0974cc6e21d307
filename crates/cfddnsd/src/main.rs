// # cfddnsd - Cloudflare DDNS Daemon
//
// Thin integration layer: all reconciliation logic lives in cfddns-core.
//
// The cfddnsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the Cloudflare provider and the HTTP IP source
// 4. Running the reconciler until SIGTERM/SIGINT
//
// ## Configuration
//
// - `CF_API_KEY`: Cloudflare API token (required for cycles to succeed)
// - `CF_DOMAIN`: Fully-qualified domain to manage (required for cycles to succeed)
// - `CF_DOMAIN_TYPE`: Record type, `A` or `AAAA` (default: A)
// - `PROXIED`: `true`/`1` to proxy the record, anything else disables it (default: true)
// - `INTERVAL`: Minutes between cycles (default: 5)
// - `LOG_LEVEL`: trace, debug, info, warn, error (default: info)
// - `PUBLIC_IP_URL`: Plaintext public IP endpoint (default: http://ipinfo.io/ip)
// - `HTTP_TIMEOUT_SECS`: Per-request timeout (default: 30)
// - `CF_API_BASE_URL`: Cloudflare API root (default: https://api.cloudflare.com/client/v4)
//
// A missing token or domain does not stop the daemon; every cycle reports
// it until the process is restarted with the variable set. Malformed
// optional values are rejected at startup.
//
// ## Example
//
// ```bash
// export CF_API_KEY=your_token
// export CF_DOMAIN=home.example.com
// export INTERVAL=10
//
// cfddnsd
// ```

use anyhow::{Context, Result};
use cfddns_core::{Config, Reconciler};
use cfddns_ip_http::HttpIpSource;
use cfddns_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime could not be created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CfddnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<CfddnsExitCode> for ExitCode {
    fn from(code: CfddnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            return CfddnsExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let log_level = match config.tracing_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{}", e);
            return CfddnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CfddnsExitCode::ConfigError.into();
    }

    info!("Starting cfddnsd daemon");
    info!("Configuration loaded: {:?}", config);

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CfddnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            CfddnsExitCode::ConfigError
        } else {
            CfddnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the reconciler and run it until a shutdown signal arrives
async fn run_daemon(config: Config) -> Result<()> {
    if let Err(e) = config.validate() {
        warn!("{} Every cycle will fail until this is set.", e);
    }

    let mut reconciler = build_reconciler(config)?;
    let shutdown = shutdown_signal().await?;

    reconciler.run_until(shutdown).await;

    info!("Shutting down daemon");
    Ok(())
}

/// Wire the Cloudflare provider and the HTTP IP source into a reconciler
fn build_reconciler(config: Config) -> Result<Reconciler> {
    let provider =
        CloudflareProvider::from_config(&config).context("Failed to create Cloudflare provider")?;
    let ip_source =
        HttpIpSource::from_config(&config).context("Failed to create HTTP IP source")?;

    info!(
        "Managing {} record for {} (proxied: {})",
        config.record_type,
        config.domain,
        config.proxied
    );

    Ok(Reconciler::new(
        config,
        Box::new(provider),
        Box::new(ip_source),
    ))
}

/// Install SIGTERM/SIGINT handlers and return a future that resolves on
/// the first of them
///
/// Handlers are installed before the first cycle runs so a signal that
/// arrives mid-cycle is not lost.
#[cfg(unix)]
async fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(async move {
        let signal = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", signal);
    })
}

/// Fallback implementation for non-Unix platforms (Ctrl-C only)
#[cfg(not(unix))]
async fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: Ctrl-C"),
            Err(e) => {
                error!("Failed to wait for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    })
}
