//! Property tests: any signal sequence drives issues only along legal edges.
//!
//! Each issue's transitions form a chain starting at creation, where every
//! edge leaves the state the previous edge entered.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use proptest::prelude::*;
use pulse_monitor::{AlertTracker, Evaluation, Signal, TrackerConfig};
use pulse_types::{HealthBand, IssueId, IssueKind, IssueState, IssueTransition, Severity};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Low),
        Just(Severity::Medium),
        Just(Severity::High),
        Just(Severity::Critical),
    ]
}

fn arb_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![
        arb_severity().prop_map(|severity| Signal::Breach {
            severity,
            description: "breach".to_string(),
        }),
        Just(Signal::Hold),
        Just(Signal::Clear),
    ]
}

/// (label index, low-score signal, variance signal, seconds to advance)
fn arb_step() -> impl Strategy<Value = (usize, Signal, Signal, i64)> {
    (0usize..3, arb_signal(), arb_signal(), 0i64..20)
}

fn evaluation(label: &str, low_score: Signal, variance: Signal) -> Evaluation {
    let mut signals = BTreeMap::new();
    signals.insert(IssueKind::LowScore, low_score);
    signals.insert(IssueKind::VarianceSpike, variance);
    Evaluation {
        label: label.to_string(),
        value: 0.5,
        trend: 0.0,
        band: HealthBand::NeedsAttention,
        severity: Severity::Medium,
        signals,
    }
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn transitions_form_legal_chains(steps in prop::collection::vec(arb_step(), 1..120)) {
        let mut tracker = AlertTracker::new(TrackerConfig {
            dwell_ms: 15_000,
            retention_secs: 40,
        });
        let labels = ["overall", "responsiveness", "capacity"];
        let mut now = Utc::now();
        let mut transitions: Vec<IssueTransition> = Vec::new();

        for (label, low_score, variance, advance) in steps {
            now += Duration::seconds(advance);
            transitions.extend(tracker.observe(&evaluation(labels[label], low_score, variance), now));
            transitions.extend(tracker.sweep(now));
        }

        let mut last_state: BTreeMap<IssueId, IssueState> = BTreeMap::new();
        for t in &transitions {
            prop_assert!(t.is_valid(), "illegal edge {:?} -> {:?}", t.from, t.to);
            match t.from {
                None => {
                    prop_assert!(!last_state.contains_key(&t.issue_id));
                }
                Some(from) => {
                    prop_assert_eq!(last_state.get(&t.issue_id), Some(&from));
                }
            }
            last_state.insert(t.issue_id.clone(), t.to);
        }

        // At most one open issue per (label, kind).
        let mut open = BTreeMap::new();
        for issue in tracker.active_issues() {
            let key = (issue.label.clone(), issue.kind);
            prop_assert!(open.insert(key, issue.id.clone()).is_none());
        }
    }
}
