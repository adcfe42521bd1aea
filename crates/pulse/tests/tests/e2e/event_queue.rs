//! End-to-end test: event queue backpressure under both policies.

use pulse_monitor::{Backpressure, MonitorConfig};
use pulse_tests::{standard_composites, Harness};
use pulse_types::IssueState;

/// Two composites breach then clear: four transitions into a queue of two.
async fn overflow(backpressure: Backpressure) -> Harness {
    let mut config = MonitorConfig::new("harness", standard_composites());
    config.events.capacity = 2;
    config.events.backpressure = backpressure;

    let mut harness = Harness::with_config(config, 0.9).unwrap();
    harness.run(20).await;
    harness.set_all(0.25);
    harness.tick().await;
    harness.set_all(0.9);
    harness.tick().await;
    harness
}

#[tokio::test]
async fn drop_oldest_keeps_latest_transitions() {
    let harness = overflow(Backpressure::DropOldest).await;
    let events = harness.monitor.context().events.snapshot();

    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.to == IssueState::Resolving));
    assert_eq!(harness.monitor.context().events.lost(), 2);
}

#[tokio::test]
async fn reject_new_keeps_earliest_transitions() {
    let harness = overflow(Backpressure::RejectNew).await;
    let events = harness.monitor.context().events.snapshot();

    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.to == IssueState::Active));
    assert_eq!(harness.monitor.context().events.lost(), 2);

    let exposition = harness.registry.export().unwrap();
    assert!(exposition.contains("pulse_events_lost_total{monitor=\"harness\"} 2"));
}

#[tokio::test]
async fn consumer_drain_makes_room() {
    let harness = overflow(Backpressure::RejectNew).await;
    let events = harness.monitor.context().events.clone();

    let drained = events.drain();
    assert_eq!(drained.len(), 2);
    assert!(events.is_empty());
}
