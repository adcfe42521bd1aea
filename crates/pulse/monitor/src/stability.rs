//! Stability analysis over a history window.
//!
//! Each score is in [0.0, 1.0] with 1.0 meaning perfectly steady.

use serde::{Deserialize, Serialize};

use crate::history::slope;

/// Minimum samples before sliding-window slopes are considered.
const TREND_MIN_SAMPLES: usize = 5;

/// Minimum samples before oscillation is measured.
const OSCILLATION_MIN_SAMPLES: usize = 10;

/// Largest sliding window used for trend stability.
const TREND_WINDOW_MAX: usize = 10;

/// Stability of one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    /// `1 − 10·variance`, floored at zero.
    pub variance_score: f64,

    /// `1 − 5·mean absolute deviation`, floored at zero.
    pub consistency_score: f64,

    /// Inverse spread of sliding-window slopes.
    pub trend_stability: f64,

    /// Share of direction changes, capped at 1.0.
    pub oscillation: f64,

    /// Weighted summary of the above.
    pub overall: f64,

    /// Number of samples analysed.
    pub samples: usize,
}

impl StabilityReport {
    /// Analyse a window, oldest value first.
    ///
    /// Returns `None` with fewer than `min_samples` (or two) values.
    pub fn analyze(values: &[f64], min_samples: usize) -> Option<Self> {
        let n = values.len();
        if n < min_samples.max(2) {
            return None;
        }

        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let variance_score = (1.0 - variance * 10.0).max(0.0);

        let mean_deviation = values.iter().map(|v| (v - mean).abs()).sum::<f64>() / n as f64;
        let consistency_score = (1.0 - mean_deviation * 5.0).max(0.0);

        let trend_stability = trend_stability(values);
        let oscillation = oscillation(values);

        let overall = variance_score * 0.3
            + consistency_score * 0.3
            + trend_stability * 0.3
            + (1.0 - oscillation) * 0.1;

        Some(Self {
            variance_score,
            consistency_score,
            trend_stability,
            oscillation,
            overall: overall.clamp(0.0, 1.0),
            samples: n,
        })
    }

    pub fn is_finite(&self) -> bool {
        self.variance_score.is_finite()
            && self.consistency_score.is_finite()
            && self.trend_stability.is_finite()
            && self.oscillation.is_finite()
            && self.overall.is_finite()
    }
}

/// `1 − 100·variance` of slopes over overlapping windows.
fn trend_stability(values: &[f64]) -> f64 {
    let n = values.len();
    if n < TREND_MIN_SAMPLES {
        return 0.5;
    }

    let window = TREND_WINDOW_MAX.min(n / 2);
    let slopes: Vec<f64> = values
        .windows(window)
        .map(|w| slope(w.iter().copied()))
        .collect();

    if slopes.len() < 2 {
        return 1.0;
    }

    let mean = slopes.iter().sum::<f64>() / slopes.len() as f64;
    let spread =
        slopes.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (slopes.len() - 1) as f64;
    (1.0 - spread * 100.0).max(0.0)
}

/// Direction changes per sample, doubled and capped at 1.0.
fn oscillation(values: &[f64]) -> f64 {
    let n = values.len();
    if n < OSCILLATION_MIN_SAMPLES {
        return 0.0;
    }

    let changes = values
        .windows(3)
        .filter(|w| {
            let prev = w[1] - w[0];
            let curr = w[2] - w[1];
            (prev > 0.0 && curr < 0.0) || (prev < 0.0 && curr > 0.0)
        })
        .count();

    (changes as f64 / n as f64 * 2.0).min(1.0)
}
