//! End-to-end test: a sharp drop raises an issue that resolves after the dwell.

use pulse_tests::Harness;
use pulse_types::{HealthBand, IssueKind, IssueState, Severity};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Warm up at 0.9 then drop every source to 0.25 for one tick.
async fn dropped_harness() -> Harness {
    let mut harness = Harness::new(0.9).unwrap();
    harness.run(20).await;
    harness.set_all(0.25);
    harness.tick().await;
    harness
}

fn low_score_state(harness: &Harness, label: &str) -> Option<IssueState> {
    harness
        .monitor
        .tracker()
        .open_issue(label, IssueKind::LowScore)
        .map(|issue| issue.state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn drop_raises_active_issue() {
    let harness = dropped_harness().await;
    let status = harness.monitor.status();

    assert_eq!(status.bands.get("overall"), Some(&HealthBand::NeedsAttention));
    assert!(status.is_system_unhealthy());
    assert!(!status.is_monitoring_degraded());

    let overall: Vec<_> = status
        .active_issues
        .iter()
        .filter(|i| i.label == "overall" && i.kind == IssueKind::LowScore)
        .collect();
    assert_eq!(overall.len(), 1);
    assert_eq!(overall[0].state, IssueState::Active);
    assert_eq!(overall[0].severity, Severity::High);
}

#[tokio::test]
async fn recovery_passes_through_resolving_to_resolved() {
    let mut harness = dropped_harness().await;

    harness.set_all(0.9);
    let report = harness.tick().await;
    assert!(report
        .transitions
        .iter()
        .any(|t| t.label == "overall" && t.to == IssueState::Resolving));
    assert_eq!(low_score_state(&harness, "overall"), Some(IssueState::Resolving));
    // Still reported while resolving.
    assert!(!harness.monitor.status().active_issues.is_empty());

    // Default dwell is 30 s at 1 Hz.
    harness.run(29).await;
    assert_eq!(low_score_state(&harness, "overall"), Some(IssueState::Resolving));

    let report = harness.tick().await;
    assert!(report
        .transitions
        .iter()
        .any(|t| t.label == "overall" && t.to == IssueState::Resolved));
    assert_eq!(low_score_state(&harness, "overall"), None);

    let status = harness.monitor.status();
    assert!(status.active_issues.is_empty());
    assert_eq!(status.bands.get("overall"), Some(&HealthBand::Good));
    assert!(!status.is_system_unhealthy());
}

#[tokio::test]
async fn relapse_during_dwell_reactivates_same_issue() {
    let mut harness = dropped_harness().await;
    let original = harness
        .monitor
        .tracker()
        .open_issue("overall", IssueKind::LowScore)
        .unwrap()
        .id
        .clone();

    harness.set_all(0.9);
    harness.run(10).await;
    assert_eq!(low_score_state(&harness, "overall"), Some(IssueState::Resolving));

    harness.set_all(0.25);
    let report = harness.tick().await;
    let relapse = report
        .transitions
        .iter()
        .find(|t| t.label == "overall" && t.kind == IssueKind::LowScore)
        .unwrap();
    assert_eq!(relapse.from, Some(IssueState::Resolving));
    assert_eq!(relapse.to, IssueState::Active);
    assert_eq!(relapse.issue_id, original);
}

#[tokio::test]
async fn sustained_breach_does_not_duplicate_issues() {
    let mut harness = dropped_harness().await;
    harness.run(15).await;

    let status = harness.monitor.status();
    let overall = status
        .active_issues
        .iter()
        .filter(|i| i.label == "overall" && i.kind == IssueKind::LowScore)
        .count();
    assert_eq!(overall, 1);
}
