//! End-to-end test: unavailable and slow sources.
//!
//! A failed read falls back to the last known good value, so the composite
//! does not move; repeated failures mark monitoring degraded without marking
//! the monitored system unhealthy.

use pulse_monitor::{MonitorConfig, MonitorError};
use pulse_tests::{standard_composites, Harness};
use pulse_types::MonitoringHealth;

#[tokio::test]
async fn unavailable_source_keeps_composite_unchanged() {
    let mut harness = Harness::new(0.9).unwrap();
    harness.run(5).await;
    let before = harness.monitor.status().composite_scores["overall"];

    harness.handle("cpu").unwrap().fail();
    let report = harness.tick().await;

    assert!(matches!(
        report.sample_failures.as_slice(),
        [MonitorError::SampleUnavailable { source_name, .. }] if source_name == "cpu"
    ));
    assert!(report.missing_inputs.is_empty());
    let after = harness.monitor.status().composite_scores["overall"];
    assert!((after - before).abs() < 1e-12);
    assert!(report.transitions.is_empty());
}

#[tokio::test(start_paused = true)]
async fn stalled_source_times_out_and_uses_last_known_good() {
    let mut config = MonitorConfig::new("harness", standard_composites());
    config.sampler.timeout_ms = 100;
    let mut harness = Harness::with_config(config, 0.9).unwrap();
    harness.run(3).await;

    harness.handle("latency").unwrap().stall();
    let report = harness.tick().await;

    assert!(matches!(
        report.sample_failures.as_slice(),
        [MonitorError::SampleTimeout { source_name, timeout_ms: 100 }] if source_name == "latency"
    ));
    let status = harness.monitor.status();
    assert!((status.composite_scores["responsiveness"] - 0.9).abs() < 1e-12);
}

#[tokio::test]
async fn repeated_failures_degrade_monitoring_only() {
    let mut harness = Harness::new(0.9).unwrap();
    harness.run(3).await;

    harness.handle("errors").unwrap().fail();
    harness.run(2).await;
    assert_eq!(harness.monitor.status().monitoring, MonitoringHealth::Nominal);

    // Default threshold is three consecutive failures.
    harness.tick().await;
    let status = harness.monitor.status();
    assert_eq!(
        status.monitoring,
        MonitoringHealth::Degraded {
            failing_sources: vec!["errors".to_string()]
        }
    );
    assert!(status.is_monitoring_degraded());
    assert!(!status.is_system_unhealthy());

    harness.handle("errors").unwrap().set(0.9);
    harness.tick().await;
    assert_eq!(harness.monitor.status().monitoring, MonitoringHealth::Nominal);
}

#[tokio::test]
async fn source_without_history_is_defaulted() {
    let mut harness = Harness::new(0.9).unwrap();
    harness.handle("saturation").unwrap().fail();

    let report = harness.tick().await;
    assert!(report.missing_inputs.iter().any(|e| matches!(
        e,
        MonitorError::AggregationInputMissing { label, metric }
            if label == "overall" && metric == "saturation"
    )));
    // 0.8 · 0.9 + 0.2 · 0.5
    let overall = harness.monitor.status().composite_scores["overall"];
    assert!((overall - 0.82).abs() < 1e-12);
}
