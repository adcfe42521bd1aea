//! Weighted composite scores.

use std::collections::BTreeMap;

use pulse_types::{CompositeScore, MetricSample};

use crate::config::{AggregationConfig, WeightTable};
use crate::error::{MonitorError, MonitorResult};

/// Composite scores for one tick, plus any inputs that had to be defaulted.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub scores: Vec<CompositeScore>,
    pub missing: Vec<MonitorError>,
}

impl Aggregation {
    pub fn score(&self, label: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.label == label).map(|s| s.value)
    }
}

/// Combines metric samples into composite scores using fixed weight tables.
#[derive(Debug, Clone)]
pub struct Aggregator {
    tables: Vec<WeightTable>,
    default_value: f64,
}

impl Aggregator {
    /// Build from validated tables.
    pub fn new(tables: Vec<WeightTable>, default_value: f64) -> MonitorResult<Self> {
        for table in &tables {
            table.validate()?;
        }
        Ok(Self {
            tables,
            default_value: default_value.clamp(0.0, 1.0),
        })
    }

    pub fn from_config(config: &AggregationConfig) -> MonitorResult<Self> {
        Self::new(config.composites.clone(), config.default_value)
    }

    pub fn tables(&self) -> &[WeightTable] {
        &self.tables
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.label.as_str())
    }

    /// Compute every composite. Missing inputs take the default value.
    pub fn aggregate(&self, samples: &BTreeMap<String, MetricSample>) -> Aggregation {
        let mut aggregation = Aggregation::default();

        for table in &self.tables {
            let mut value = 0.0;
            for (metric, weight) in &table.weights {
                let input = match samples.get(metric) {
                    Some(sample) => sample.value,
                    None => {
                        aggregation.missing.push(MonitorError::AggregationInputMissing {
                            label: table.label.clone(),
                            metric: metric.clone(),
                        });
                        self.default_value
                    }
                };
                value += input * weight;
            }
            aggregation.scores.push(CompositeScore::new(
                table.label.clone(),
                value,
                table.weights.clone(),
            ));
        }

        aggregation
    }
}
