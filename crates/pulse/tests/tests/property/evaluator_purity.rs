//! Property tests: evaluation is a deterministic function of its input.

use std::collections::BTreeMap;

use proptest::prelude::*;
use pulse_monitor::{Evaluate, EvaluationInput, StabilityReport, ThresholdEvaluator};
use pulse_types::{CompositeScore, HealthBand, IssueKind};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn arb_history() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..=1.0, 0..40)
}

fn arb_trend() -> impl Strategy<Value = f64> {
    -0.2f64..0.2
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn identical_input_identical_output(
        value in 0.0f64..=1.0,
        trend in arb_trend(),
        history in arb_history(),
    ) {
        let evaluator = ThresholdEvaluator::with_default_thresholds();
        let score = CompositeScore::new("overall", value, BTreeMap::new());
        let report = StabilityReport::analyze(&history, 5);
        let input = EvaluationInput {
            score: &score,
            trend,
            stability: report.as_ref(),
        };

        let first = evaluator.evaluate(&input).unwrap();
        let second = evaluator.evaluate(&input).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn band_is_monotone_in_value(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let evaluator = ThresholdEvaluator::with_default_thresholds();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(evaluator.band(lo) <= evaluator.band(hi));
        prop_assert!(evaluator.base_severity(lo) >= evaluator.base_severity(hi));
    }

    #[test]
    fn needs_attention_always_breaches(value in 0.0f64..0.6, trend in arb_trend()) {
        let evaluator = ThresholdEvaluator::with_default_thresholds();
        let score = CompositeScore::new("overall", value, BTreeMap::new());
        let evaluation = evaluator
            .evaluate(&EvaluationInput { score: &score, trend, stability: None })
            .unwrap();
        prop_assert_eq!(evaluation.band, HealthBand::NeedsAttention);
        prop_assert!(evaluation.is_breaching(IssueKind::LowScore));
    }
}
