//! Monitor configuration.
//!
//! Weight tables, cut points and lifecycle timings are configuration rather
//! than code; [`MonitorConfig::validate`] rejects inconsistent values at load.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use pulse_types::Severity;
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, MonitorResult};
use crate::queue::Backpressure;

/// Tolerance on the sum of a weight table.
pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Slowest accepted tick rate (one tick every ~11.5 days).
pub const MIN_TICK_RATE_HZ: f64 = 1e-6;

/// Fastest accepted tick rate (one tick per microsecond).
pub const MAX_TICK_RATE_HZ: f64 = 1e6;

/// Configuration for a single monitor loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Monitor name, used in logs, metrics and status.
    pub name: String,

    /// Ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: f64,

    /// Samples retained per metric and per composite.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Sampler configuration.
    #[serde(default)]
    pub sampler: SamplerConfig,

    /// Composite definitions.
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Evaluation cut points.
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Issue lifecycle timings.
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Transition event queue.
    #[serde(default)]
    pub events: EventQueueConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            name: "monitor".to_string(),
            tick_rate_hz: default_tick_rate(),
            history_capacity: default_history_capacity(),
            sampler: SamplerConfig::default(),
            aggregation: AggregationConfig::default(),
            thresholds: ThresholdConfig::default(),
            tracker: TrackerConfig::default(),
            events: EventQueueConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Create a config with the given name and composites, defaults elsewhere.
    pub fn new(name: impl Into<String>, composites: Vec<WeightTable>) -> Self {
        Self {
            name: name.into(),
            aggregation: AggregationConfig {
                composites,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Interval between ticks; non-zero for any rate that passes validation.
    pub fn tick_interval(&self) -> MonitorResult<Duration> {
        Duration::try_from_secs_f64(1.0 / self.tick_rate_hz)
            .ok()
            .filter(|period| !period.is_zero())
            .ok_or_else(|| {
                MonitorError::Configuration(format!(
                    "tick rate {} Hz has no representable interval",
                    self.tick_rate_hz
                ))
            })
    }

    /// Check the whole configuration for consistency.
    pub fn validate(&self) -> MonitorResult<()> {
        if self.name.trim().is_empty() {
            return Err(MonitorError::Configuration("monitor name is empty".into()));
        }
        if !(MIN_TICK_RATE_HZ..=MAX_TICK_RATE_HZ).contains(&self.tick_rate_hz) {
            return Err(MonitorError::Configuration(format!(
                "tick rate must be within [{}, {}] Hz, got {}",
                MIN_TICK_RATE_HZ, MAX_TICK_RATE_HZ, self.tick_rate_hz
            )));
        }
        self.tick_interval()?;
        if self.history_capacity < 2 {
            return Err(MonitorError::Configuration(format!(
                "history capacity must be at least 2, got {}",
                self.history_capacity
            )));
        }
        self.sampler.validate()?;
        self.aggregation.validate()?;
        self.thresholds.validate()?;
        if self.history_capacity < self.thresholds.stability_min_samples {
            return Err(MonitorError::Configuration(format!(
                "history capacity {} is below the {} samples stability analysis needs",
                self.history_capacity, self.thresholds.stability_min_samples
            )));
        }
        self.tracker.validate()?;
        if self.events.capacity == 0 {
            return Err(MonitorError::Configuration(
                "event queue capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Sampler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Per-source read timeout.
    #[serde(default = "default_sample_timeout")]
    pub timeout_ms: u64,

    /// Consecutive failures before a source counts as failing.
    #[serde(default = "default_degraded_after")]
    pub degraded_after_failures: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_sample_timeout(),
            degraded_after_failures: default_degraded_after(),
        }
    }
}

impl SamplerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn validate(&self) -> MonitorResult<()> {
        if self.timeout_ms == 0 {
            return Err(MonitorError::Configuration("sample timeout must be non-zero".into()));
        }
        if self.degraded_after_failures == 0 {
            return Err(MonitorError::Configuration(
                "degraded_after_failures must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Composite definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Value substituted for a metric with no sample.
    #[serde(default = "default_missing_value")]
    pub default_value: f64,

    /// One weight table per composite.
    #[serde(default)]
    pub composites: Vec<WeightTable>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            default_value: default_missing_value(),
            composites: Vec::new(),
        }
    }
}

impl AggregationConfig {
    fn validate(&self) -> MonitorResult<()> {
        if !(0.0..=1.0).contains(&self.default_value) {
            return Err(MonitorError::Configuration(format!(
                "default value must be within [0, 1], got {}",
                self.default_value
            )));
        }
        if self.composites.is_empty() {
            return Err(MonitorError::Configuration("no composites configured".into()));
        }
        let mut labels = BTreeSet::new();
        for table in &self.composites {
            if !labels.insert(table.label.as_str()) {
                return Err(MonitorError::Configuration(format!(
                    "duplicate composite label {}",
                    table.label
                )));
            }
            table.validate()?;
        }
        Ok(())
    }
}

/// Metric weights for one composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    /// Composite label.
    pub label: String,

    /// Metric name to weight; weights sum to 1.0.
    pub weights: BTreeMap<String, f64>,
}

impl WeightTable {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            weights: BTreeMap::new(),
        }
    }

    /// Builder-style weight insertion.
    pub fn with_weight(mut self, metric: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(metric.into(), weight);
        self
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Check the table is a convex combination.
    pub fn validate(&self) -> MonitorResult<()> {
        let invalid = |reason: String| MonitorError::InvalidWeights {
            label: self.label.clone(),
            reason,
        };

        if self.label.trim().is_empty() {
            return Err(invalid("label is empty".into()));
        }
        if self.weights.is_empty() {
            return Err(invalid("no weights".into()));
        }
        for (metric, weight) in &self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(invalid(format!("weight for {} is {}", metric, weight)));
            }
        }
        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(invalid(format!("weights sum to {}, expected 1.0", total)));
        }
        Ok(())
    }
}

/// Evaluation cut points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Lower bound of the optimal band.
    pub optimal: f64,

    /// Lower bound of the good band.
    pub good: f64,

    /// Lower bound of the adequate band.
    pub adequate: f64,

    /// Scores below this are critical.
    pub critical_below: f64,

    /// Scores below this are high severity.
    pub high_below: f64,

    /// Scores below this are medium severity.
    pub medium_below: f64,

    /// Minimum severity that raises a low-score issue.
    pub alert_floor: Severity,

    /// Per-tick slope at or below which severity escalates one step.
    pub decline_trend: f64,

    /// Variance score below which a variance spike is raised.
    pub variance_spike_below: f64,

    /// Variance score at or above which a variance spike clears.
    pub variance_recovered_at: f64,

    /// Minimum history length for stability analysis.
    pub stability_min_samples: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            optimal: 0.95,
            good: 0.8,
            adequate: 0.6,
            critical_below: 0.2,
            high_below: 0.4,
            medium_below: 0.6,
            alert_floor: Severity::Medium,
            decline_trend: -0.05,
            variance_spike_below: 0.5,
            variance_recovered_at: 0.7,
            stability_min_samples: 5,
        }
    }
}

impl ThresholdConfig {
    fn validate(&self) -> MonitorResult<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        let cut_points = [
            self.optimal,
            self.good,
            self.adequate,
            self.critical_below,
            self.high_below,
            self.medium_below,
            self.variance_spike_below,
            self.variance_recovered_at,
        ];
        if !cut_points.iter().all(|v| in_unit(*v)) {
            return Err(MonitorError::Configuration(
                "threshold cut points must be within [0, 1]".into(),
            ));
        }
        if !(self.adequate <= self.good && self.good <= self.optimal) {
            return Err(MonitorError::Configuration(
                "band cut points must satisfy adequate <= good <= optimal".into(),
            ));
        }
        if !(self.critical_below <= self.high_below && self.high_below <= self.medium_below) {
            return Err(MonitorError::Configuration(
                "severity cut points must satisfy critical <= high <= medium".into(),
            ));
        }
        if self.variance_spike_below > self.variance_recovered_at {
            return Err(MonitorError::Configuration(
                "variance spike threshold must not exceed its recovery threshold".into(),
            ));
        }
        if !self.decline_trend.is_finite() || self.decline_trend > 0.0 {
            return Err(MonitorError::Configuration(
                "decline trend must be a non-positive slope".into(),
            ));
        }
        if self.stability_min_samples < 2 {
            return Err(MonitorError::Configuration(
                "stability analysis needs at least 2 samples".into(),
            ));
        }
        Ok(())
    }
}

/// Issue lifecycle timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// How long a condition must stay clear before an issue resolves.
    #[serde(default = "default_dwell_ms")]
    pub dwell_ms: u64,

    /// How long a resolved issue is retained before purge.
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            dwell_ms: default_dwell_ms(),
            retention_secs: default_retention_secs(),
        }
    }
}

impl TrackerConfig {
    /// Both windows must fit a millisecond-precision duration.
    pub fn validate(&self) -> MonitorResult<()> {
        const MAX_MS: u64 = i64::MAX as u64 / 1_000;
        if self.dwell_ms > MAX_MS {
            return Err(MonitorError::Configuration(format!(
                "dwell of {} ms is out of range",
                self.dwell_ms
            )));
        }
        if self.retention_secs > MAX_MS / 1_000 {
            return Err(MonitorError::Configuration(format!(
                "retention of {} s is out of range",
                self.retention_secs
            )));
        }
        Ok(())
    }

    pub fn dwell(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.dwell_ms as i64)
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.retention_secs as i64)
    }
}

/// Transition event queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventQueueConfig {
    /// Maximum queued transitions.
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,

    /// What to do when the queue is full.
    #[serde(default)]
    pub backpressure: Backpressure,
}

impl Default for EventQueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
            backpressure: Backpressure::default(),
        }
    }
}

// Default value helpers
fn default_tick_rate() -> f64 {
    1.0
}

fn default_history_capacity() -> usize {
    60
}

fn default_sample_timeout() -> u64 {
    250
}

fn default_degraded_after() -> u32 {
    3
}

fn default_missing_value() -> f64 {
    0.5
}

fn default_dwell_ms() -> u64 {
    30_000
}

fn default_retention_secs() -> u64 {
    300
}

fn default_event_capacity() -> usize {
    256
}
