//! Threshold evaluation of composite scores.
//!
//! Evaluation is a pure function of its input: identical input always yields
//! an identical [`Evaluation`].

use std::collections::BTreeMap;

use pulse_types::{CompositeScore, HealthBand, IssueKind, Severity};
use serde::{Deserialize, Serialize};

use crate::config::ThresholdConfig;
use crate::error::{MonitorError, MonitorResult};
use crate::stability::StabilityReport;

/// Everything the evaluator looks at for one composite.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationInput<'a> {
    pub score: &'a CompositeScore,
    pub trend: f64,
    pub stability: Option<&'a StabilityReport>,
}

/// Per-kind verdict for the alert tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum Signal {
    /// The condition holds now.
    Breach { severity: Severity, description: String },
    /// Neither breaching nor recovered.
    Hold,
    /// The condition is absent.
    Clear,
}

/// Classification of one composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub label: String,
    pub value: f64,
    pub trend: f64,
    pub band: HealthBand,
    pub severity: Severity,
    pub signals: BTreeMap<IssueKind, Signal>,
}

impl Evaluation {
    pub fn signal(&self, kind: IssueKind) -> Option<&Signal> {
        self.signals.get(&kind)
    }

    pub fn is_breaching(&self, kind: IssueKind) -> bool {
        matches!(self.signals.get(&kind), Some(Signal::Breach { .. }))
    }
}

/// Evaluates a composite score against thresholds.
pub trait Evaluate: Send + Sync {
    fn evaluate(&self, input: &EvaluationInput<'_>) -> MonitorResult<Evaluation>;
}

/// Fixed cut-point evaluator.
#[derive(Debug, Clone)]
pub struct ThresholdEvaluator {
    thresholds: ThresholdConfig,
}

impl ThresholdEvaluator {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    pub fn with_default_thresholds() -> Self {
        Self::new(ThresholdConfig::default())
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// Band for a score; lower bounds are inclusive.
    pub fn band(&self, value: f64) -> HealthBand {
        if value >= self.thresholds.optimal {
            HealthBand::Optimal
        } else if value >= self.thresholds.good {
            HealthBand::Good
        } else if value >= self.thresholds.adequate {
            HealthBand::Adequate
        } else {
            HealthBand::NeedsAttention
        }
    }

    /// Severity from the score alone.
    pub fn base_severity(&self, value: f64) -> Severity {
        if value < self.thresholds.critical_below {
            Severity::Critical
        } else if value < self.thresholds.high_below {
            Severity::High
        } else if value < self.thresholds.medium_below {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Severity from score and trend.
    pub fn severity(&self, value: f64, trend: f64) -> Severity {
        let base = self.base_severity(value);
        if trend <= self.thresholds.decline_trend && self.band(value) != HealthBand::Optimal {
            base.escalate()
        } else {
            base
        }
    }

    fn low_score_signal(&self, label: &str, value: f64, severity: Severity) -> Signal {
        if severity >= self.thresholds.alert_floor {
            Signal::Breach {
                severity,
                description: format!(
                    "{} score {:.3} is {} severity (alert floor {})",
                    label, value, severity, self.thresholds.alert_floor
                ),
            }
        } else {
            Signal::Clear
        }
    }

    fn variance_signal(&self, label: &str, stability: Option<&StabilityReport>) -> Signal {
        let Some(report) = stability else {
            return Signal::Clear;
        };

        if report.variance_score < self.thresholds.variance_spike_below {
            let shortfall = (self.thresholds.variance_spike_below - report.variance_score)
                / self.thresholds.variance_spike_below.max(f64::EPSILON);
            let severity = if shortfall >= 0.75 {
                Severity::High
            } else if shortfall >= 0.4 {
                Severity::Medium
            } else {
                Severity::Low
            };
            Signal::Breach {
                severity,
                description: format!(
                    "{} variance score {:.3} below {:.3}",
                    label, report.variance_score, self.thresholds.variance_spike_below
                ),
            }
        } else if report.variance_score >= self.thresholds.variance_recovered_at {
            Signal::Clear
        } else {
            Signal::Hold
        }
    }
}

impl Evaluate for ThresholdEvaluator {
    fn evaluate(&self, input: &EvaluationInput<'_>) -> MonitorResult<Evaluation> {
        let label = input.score.label.as_str();
        let value = input.score.value;

        if !value.is_finite() {
            return Err(MonitorError::EvaluatorFault(format!(
                "{} has non-finite score {}",
                label, value
            )));
        }
        if !input.trend.is_finite() {
            return Err(MonitorError::EvaluatorFault(format!(
                "{} has non-finite trend {}",
                label, input.trend
            )));
        }
        if let Some(report) = input.stability {
            if !report.is_finite() {
                return Err(MonitorError::EvaluatorFault(format!(
                    "{} has non-finite stability report",
                    label
                )));
            }
        }

        let band = self.band(value);
        let severity = self.severity(value, input.trend);

        let mut signals = BTreeMap::new();
        signals.insert(IssueKind::LowScore, self.low_score_signal(label, value, severity));
        signals.insert(IssueKind::VarianceSpike, self.variance_signal(label, input.stability));

        Ok(Evaluation {
            label: label.to_string(),
            value,
            trend: input.trend,
            band,
            severity,
            signals,
        })
    }
}
