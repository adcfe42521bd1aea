//! Metric sources and the per-tick sampler.
//!
//! Sources are injected; the sampler wraps every read in a timeout and falls
//! back to the last known good value when a source cannot answer.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pulse_types::MetricSample;
use tracing::{debug, warn};

use crate::config::SamplerConfig;
use crate::error::{MonitorError, MonitorResult};

/// A named metric source producing values in [0.0, 1.0].
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Metric name this source produces.
    fn name(&self) -> &str;

    /// Read the current value.
    async fn read(&self) -> MonitorResult<f64>;
}

/// Outcome of one sampling pass.
#[derive(Debug, Default)]
pub struct SampleSet {
    /// One sample per metric that has a fresh or last-known-good value.
    pub samples: BTreeMap<String, MetricSample>,

    /// Metrics served from last-known-good this pass.
    pub stale: BTreeSet<String>,

    /// Read failures this pass.
    pub failures: Vec<MonitorError>,
}

impl SampleSet {
    pub fn value(&self, name: &str) -> Option<f64> {
        self.samples.get(name).map(|s| s.value)
    }

    pub fn is_fresh(&self, name: &str) -> bool {
        self.samples.contains_key(name) && !self.stale.contains(name)
    }
}

struct SourceSlot {
    source: Box<dyn MetricSource>,
    last_good: Option<MetricSample>,
    consecutive_failures: u32,
}

/// Reads every registered source once per tick.
pub struct Sampler {
    slots: Vec<SourceSlot>,
    config: SamplerConfig,
}

impl Sampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            slots: Vec::new(),
            config,
        }
    }

    /// Register a source; a source with a duplicate name is rejected.
    pub fn add_source(&mut self, source: Box<dyn MetricSource>) -> MonitorResult<()> {
        if self.slots.iter().any(|s| s.source.name() == source.name()) {
            return Err(MonitorError::Configuration(format!(
                "duplicate metric source {}",
                source.name()
            )));
        }
        self.slots.push(SourceSlot {
            source,
            last_good: None,
            consecutive_failures: 0,
        });
        Ok(())
    }

    pub fn with_source(mut self, source: impl MetricSource + 'static) -> MonitorResult<Self> {
        self.add_source(Box::new(source))?;
        Ok(self)
    }

    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.source.name())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Read all sources concurrently, each bounded by the configured timeout.
    pub async fn sample(&mut self, now: DateTime<Utc>) -> SampleSet {
        let timeout = self.config.timeout();
        let reads = self
            .slots
            .iter()
            .map(|slot| read_with_timeout(slot.source.as_ref(), timeout));
        let results = futures::future::join_all(reads).await;

        let mut set = SampleSet::default();
        for (slot, result) in self.slots.iter_mut().zip(results) {
            let name = slot.source.name().to_string();
            match result {
                Ok(value) => {
                    let sample = MetricSample::new(name.clone(), value, now);
                    slot.last_good = Some(sample.clone());
                    slot.consecutive_failures = 0;
                    set.samples.insert(name, sample);
                }
                Err(error) => {
                    slot.consecutive_failures = slot.consecutive_failures.saturating_add(1);
                    match &slot.last_good {
                        Some(last_good) => {
                            debug!(
                                source_name = %name,
                                error = %error,
                                failures = slot.consecutive_failures,
                                "Using last known good value"
                            );
                            set.samples.insert(name.clone(), last_good.clone());
                            set.stale.insert(name);
                        }
                        None => {
                            warn!(
                                source_name = %name,
                                error = %error,
                                "Source unavailable with no prior value"
                            );
                        }
                    }
                    set.failures.push(error);
                }
            }
        }
        set
    }

    /// Sources whose consecutive failures reached the degraded threshold.
    pub fn failing_sources(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|s| s.consecutive_failures >= self.config.degraded_after_failures)
            .map(|s| s.source.name().to_string())
            .collect()
    }

    pub fn consecutive_failures(&self, name: &str) -> Option<u32> {
        self.slots
            .iter()
            .find(|s| s.source.name() == name)
            .map(|s| s.consecutive_failures)
    }
}

async fn read_with_timeout(source: &dyn MetricSource, timeout: Duration) -> MonitorResult<f64> {
    let value = match tokio::time::timeout(timeout, source.read()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(MonitorError::SampleTimeout {
                source_name: source.name().to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    };

    if !value.is_finite() {
        return Err(MonitorError::SampleUnavailable {
            source_name: source.name().to_string(),
            reason: format!("non-finite reading {}", value),
        });
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Reading {
    Value(f64),
    Fail,
    Stall,
}

/// Push-based source whose value is set through a [`ManualHandle`].
///
/// Useful for embedding existing instrumentation and for driving tests.
pub struct ManualSource {
    name: String,
    reading: Arc<Mutex<Reading>>,
}

/// Control handle for a [`ManualSource`].
#[derive(Clone)]
pub struct ManualHandle {
    name: String,
    reading: Arc<Mutex<Reading>>,
}

impl ManualSource {
    /// Create a source and its handle, starting at `initial`.
    pub fn new(name: impl Into<String>, initial: f64) -> (Self, ManualHandle) {
        let name = name.into();
        let reading = Arc::new(Mutex::new(Reading::Value(initial)));
        (
            Self {
                name: name.clone(),
                reading: reading.clone(),
            },
            ManualHandle { name, reading },
        )
    }
}

impl ManualHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subsequent reads return `value`.
    pub fn set(&self, value: f64) {
        *self.reading.lock() = Reading::Value(value);
    }

    /// Subsequent reads fail with `SampleUnavailable`.
    pub fn fail(&self) {
        *self.reading.lock() = Reading::Fail;
    }

    /// Subsequent reads never complete.
    pub fn stall(&self) {
        *self.reading.lock() = Reading::Stall;
    }
}

#[async_trait]
impl MetricSource for ManualSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> MonitorResult<f64> {
        let reading = *self.reading.lock();
        match reading {
            Reading::Value(v) => Ok(v),
            Reading::Fail => Err(MonitorError::SampleUnavailable {
                source_name: self.name.clone(),
                reason: "source marked unavailable".into(),
            }),
            Reading::Stall => futures::future::pending().await,
        }
    }
}
