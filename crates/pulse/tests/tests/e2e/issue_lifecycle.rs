//! End-to-end test: the full issue lifecycle as seen through the event queue,
//! and evaluator faults leaving issues untouched.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pulse_monitor::{
    Evaluate, Evaluation, EvaluationInput, MonitorConfig, MonitorError, MonitorResult,
    ThresholdEvaluator,
};
use pulse_tests::{standard_composites, Harness};
use pulse_types::{HealthBand, IssueId, IssueKind, IssueState, IssueTransition};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn short_lifecycle_config() -> MonitorConfig {
    let mut config = MonitorConfig::new("harness", standard_composites());
    config.tracker.dwell_ms = 5_000;
    config.tracker.retention_secs = 10;
    config
}

/// Threshold evaluator that faults while its switch is on.
struct SwitchableEvaluator {
    inner: ThresholdEvaluator,
    failing: Arc<AtomicBool>,
}

impl Evaluate for SwitchableEvaluator {
    fn evaluate(&self, input: &EvaluationInput<'_>) -> MonitorResult<Evaluation> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MonitorError::EvaluatorFault(format!(
                "{} evaluation disabled",
                input.score.label
            )));
        }
        self.inner.evaluate(input)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn issue_walks_every_state_then_purges() {
    let mut harness = Harness::with_config(short_lifecycle_config(), 0.9).unwrap();
    harness.run(20).await;

    harness.set_all(0.25);
    harness.tick().await;
    harness.set_all(0.9);
    // 5 s dwell then 10 s retention at 1 Hz.
    harness.run(20).await;

    let events = harness.monitor.context().events.drain();
    assert!(events.iter().all(IssueTransition::is_valid));

    let mut by_issue: BTreeMap<IssueId, Vec<&IssueTransition>> = BTreeMap::new();
    for event in events.iter().filter(|e| e.kind == IssueKind::LowScore) {
        by_issue.entry(event.issue_id.clone()).or_default().push(event);
    }
    assert_eq!(by_issue.len(), 2, "one issue per composite");

    for chain in by_issue.values() {
        let states: Vec<_> = chain.iter().map(|t| (t.from, t.to)).collect();
        assert_eq!(
            states,
            vec![
                (None, IssueState::Active),
                (Some(IssueState::Active), IssueState::Resolving),
                (Some(IssueState::Resolving), IssueState::Resolved),
                (Some(IssueState::Resolved), IssueState::Purged),
            ]
        );
    }

    assert!(harness.monitor.tracker().is_empty());
    assert_eq!(harness.monitor.tracker().purged_total(), 2);
}

#[tokio::test]
async fn resolved_issue_is_retained_until_retention_elapses() {
    let mut harness = Harness::with_config(short_lifecycle_config(), 0.9).unwrap();
    harness.run(20).await;
    harness.set_all(0.25);
    harness.tick().await;
    harness.set_all(0.9);
    harness.run(7).await;

    // Resolved but not yet purged.
    let tracker = harness.monitor.tracker();
    assert!(tracker.active_issues().is_empty());
    assert!(tracker.issues().any(|i| i.state == IssueState::Resolved));
    assert!(harness.monitor.status().active_issues.is_empty());
}

#[tokio::test]
async fn evaluator_fault_preserves_issues() {
    let failing = Arc::new(AtomicBool::new(false));
    let config = MonitorConfig::new("harness", standard_composites());
    let evaluator = SwitchableEvaluator {
        inner: ThresholdEvaluator::new(config.thresholds.clone()),
        failing: failing.clone(),
    };
    let mut harness = Harness::with_evaluator(config, 0.9, Box::new(evaluator)).unwrap();
    harness.run(20).await;

    harness.set_all(0.25);
    harness.tick().await;
    let before = harness.monitor.status();
    assert_eq!(before.active_issues.len(), 2);

    failing.store(true, Ordering::SeqCst);
    harness.set_all(0.9);
    let reports = harness.run(40).await;
    for report in &reports {
        assert_eq!(report.evaluator_faults.len(), 2);
        assert!(report.transitions.is_empty());
    }

    let during = harness.monitor.status();
    assert_eq!(during.evaluator_faults, 80);
    assert_eq!(during.active_issues.len(), 2);
    assert!(during.active_issues.iter().all(|i| i.state == IssueState::Active));
    // Bands are carried over from the last successful evaluation.
    assert_eq!(during.bands.get("overall"), Some(&HealthBand::NeedsAttention));
    // Composite values are still refreshed.
    assert!((during.composite_scores["overall"] - 0.9).abs() < 1e-12);

    failing.store(false, Ordering::SeqCst);
    let report = harness.tick().await;
    assert!(report.evaluator_faults.is_empty());
    assert!(report
        .transitions
        .iter()
        .all(|t| t.to == IssueState::Resolving));
    assert_eq!(report.transitions.len(), 2);
}

#[tokio::test]
async fn evaluator_fault_defers_purge() {
    let failing = Arc::new(AtomicBool::new(false));
    let config = short_lifecycle_config();
    let evaluator = SwitchableEvaluator {
        inner: ThresholdEvaluator::new(config.thresholds.clone()),
        failing: failing.clone(),
    };
    let mut harness = Harness::with_evaluator(config, 0.9, Box::new(evaluator)).unwrap();
    harness.run(20).await;
    harness.set_all(0.25);
    harness.tick().await;
    harness.set_all(0.9);
    harness.run(7).await;
    assert!(harness
        .monitor
        .tracker()
        .issues()
        .any(|i| i.kind == IssueKind::LowScore && i.state == IssueState::Resolved));

    // Well past the 10 s retention window.
    failing.store(true, Ordering::SeqCst);
    for report in harness.run(20).await {
        assert!(report.transitions.is_empty());
    }
    let resolved = harness
        .monitor
        .tracker()
        .issues()
        .filter(|i| i.kind == IssueKind::LowScore && i.state == IssueState::Resolved)
        .count();
    assert_eq!(resolved, 2);

    failing.store(false, Ordering::SeqCst);
    let report = harness.tick().await;
    let purged = report
        .transitions
        .iter()
        .filter(|t| t.kind == IssueKind::LowScore && t.to == IssueState::Purged)
        .count();
    assert_eq!(purged, 2);
}

#[tokio::test]
async fn transitions_are_counted_in_metrics() {
    let mut harness = Harness::new(0.9).unwrap();
    harness.run(20).await;
    harness.set_all(0.25);
    harness.tick().await;

    let exposition = tokio_test::assert_ok!(harness.registry.export());
    assert!(exposition.contains("pulse_issue_transitions_total"));
    assert!(exposition.contains("state=\"active\""));
    assert!(exposition.contains("pulse_active_issues{monitor=\"harness\"} 2"));
}
