//! Metric samples and composite scores.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single reading of a named metric, normalised into [0.0, 1.0].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Metric name.
    pub name: String,

    /// Value in [0.0, 1.0].
    pub value: f64,

    /// Time the reading was taken.
    pub timestamp: DateTime<Utc>,
}

impl MetricSample {
    /// Create a sample, clamping the value into [0.0, 1.0].
    pub fn new(name: impl Into<String>, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            value: value.clamp(0.0, 1.0),
            timestamp,
        }
    }
}

/// Weighted combination of several metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    /// Composite label.
    pub label: String,

    /// Combined value in [0.0, 1.0].
    pub value: f64,

    /// Metric name to weight used for this score.
    pub inputs: BTreeMap<String, f64>,
}

impl CompositeScore {
    pub fn new(label: impl Into<String>, value: f64, inputs: BTreeMap<String, f64>) -> Self {
        Self {
            label: label.into(),
            value: value.clamp(0.0, 1.0),
            inputs,
        }
    }
}
