//! Contract Test: Run Loop and Shutdown
//!
//! Runs on tokio's paused clock, so multi-minute intervals elapse instantly.
//!
//! Constraints verified:
//! - One cycle per interval, starting immediately
//! - Cycle errors never end the loop
//! - The loop stops promptly when the shutdown signal fires

mod common;

use cfddns_core::{Config, Reconciler};
use common::*;
use std::time::Duration;

fn spawn_reconciler(
    reconciler: Reconciler,
) -> (
    tokio::sync::oneshot::Sender<()>,
    tokio::task::JoinHandle<Reconciler>,
) {
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move {
        let mut reconciler = reconciler;
        reconciler.run_with_shutdown(shutdown_rx).await;
        reconciler
    });
    (shutdown_tx, handle)
}

#[tokio::test(start_paused = true)]
async fn runs_one_cycle_per_interval() {
    let provider = MockDnsProvider::new("Z1").with_record("R1", "1.2.3.4");
    let ip_source = ControlledIpSource::new(ip("1.2.3.4"));

    let reconciler = Reconciler::new(
        test_config("home.example.com"),
        Box::new(provider.clone()),
        Box::new(ip_source.clone()),
    );
    assert_eq!(reconciler.interval(), Duration::from_secs(300));

    let (shutdown_tx, handle) = spawn_reconciler(reconciler);

    // Cycles at 0, 5 and 10 minutes
    tokio::time::sleep(Duration::from_secs(11 * 60)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    assert_eq!(ip_source.call_count(), 3);
    assert!(provider.patched_ips().is_empty());
}

#[tokio::test(start_paused = true)]
async fn errors_do_not_stop_the_loop() {
    let provider = MockDnsProvider::new("Z1").with_record("R1", "1.2.3.4");
    provider.fail_next_zone_lookup(server_error_zone());
    provider.fail_next_zone_lookup(server_error_zone());
    let ip_source = ControlledIpSource::new(ip("5.6.7.8"));

    let reconciler = Reconciler::new(
        test_config("home.example.com"),
        Box::new(provider.clone()),
        Box::new(ip_source),
    );

    let (shutdown_tx, handle) = spawn_reconciler(reconciler);

    tokio::time::sleep(Duration::from_secs(11 * 60)).await;
    shutdown_tx.send(()).unwrap();
    let reconciler = handle.await.unwrap();

    assert_eq!(provider.zone_lookup_count(), 3);
    assert_eq!(provider.patched_ips(), vec![ip("5.6.7.8")]);
    assert_eq!(reconciler.state().zone_id.as_deref(), Some("Z1"));
}

#[tokio::test(start_paused = true)]
async fn missing_config_keeps_looping() {
    let provider = MockDnsProvider::new("Z1");

    let reconciler = Reconciler::new(
        Config::new("", ""),
        Box::new(provider.clone()),
        Box::new(ControlledIpSource::new(ip("1.2.3.4"))),
    )
    .with_interval(Duration::from_secs(60));

    let (shutdown_tx, handle) = spawn_reconciler(reconciler);

    tokio::time::sleep(Duration::from_secs(10 * 60)).await;
    assert!(!handle.is_finished(), "loop keeps running without config");

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();
    assert!(provider.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_the_sleep() {
    let provider = MockDnsProvider::new("Z1").with_record("R1", "1.2.3.4");

    let reconciler = Reconciler::new(
        test_config("home.example.com"),
        Box::new(provider.clone()),
        Box::new(ControlledIpSource::new(ip("1.2.3.4"))),
    );

    let (shutdown_tx, handle) = spawn_reconciler(reconciler);

    tokio::time::sleep(Duration::from_secs(1)).await;
    shutdown_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(result.is_ok(), "loop should stop well before the 5 minute sleep ends");
    assert_eq!(provider.record_lookup_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_sender_stops_the_loop() {
    let reconciler = Reconciler::new(
        test_config("home.example.com"),
        Box::new(MockDnsProvider::new("Z1")),
        Box::new(ControlledIpSource::new(ip("1.2.3.4"))),
    );

    let (shutdown_tx, handle) = spawn_reconciler(reconciler);
    drop(shutdown_tx);

    let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(result.is_ok());
}
