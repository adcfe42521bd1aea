//! Shared fixtures for pulse end-to-end and property tests.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use pulse_monitor::{
    Evaluate, ManualHandle, ManualSource, MetricsRegistry, Monitor, MonitorConfig,
    MonitorContext, MonitorResult, Sampler, ThresholdEvaluator, TickReport, WeightTable,
};

/// Metric names used by [`standard_composites`].
pub const METRICS: [&str; 4] = ["cpu", "latency", "errors", "saturation"];

/// `overall` over all four metrics and `responsiveness` over two.
pub fn standard_composites() -> Vec<WeightTable> {
    vec![
        WeightTable::new("overall")
            .with_weight("cpu", 0.3)
            .with_weight("latency", 0.25)
            .with_weight("errors", 0.25)
            .with_weight("saturation", 0.2),
        WeightTable::new("responsiveness")
            .with_weight("latency", 0.6)
            .with_weight("errors", 0.4),
    ]
}

/// A monitor driven by manual sources and an explicit clock.
pub struct Harness {
    pub monitor: Monitor,
    pub handles: BTreeMap<String, ManualHandle>,
    pub registry: MetricsRegistry,
    pub now: DateTime<Utc>,
    pub step: Duration,
}

impl Harness {
    /// Harness over [`METRICS`] at 1 Hz, every source starting at `initial`.
    pub fn new(initial: f64) -> MonitorResult<Self> {
        Self::with_config(MonitorConfig::new("harness", standard_composites()), initial)
    }

    pub fn with_config(config: MonitorConfig, initial: f64) -> MonitorResult<Self> {
        let evaluator = ThresholdEvaluator::new(config.thresholds.clone());
        Self::with_evaluator(config, initial, Box::new(evaluator))
    }

    /// Harness whose monitor uses a custom evaluator.
    pub fn with_evaluator(
        config: MonitorConfig,
        initial: f64,
        evaluator: Box<dyn Evaluate>,
    ) -> MonitorResult<Self> {
        let registry = MetricsRegistry::new()?;
        let step = Duration::milliseconds((1000.0 / config.tick_rate_hz) as i64);
        let context = MonitorContext::new(config, registry.metrics())?;

        let mut sampler = Sampler::new(context.config.sampler.clone());
        let mut handles = BTreeMap::new();
        for name in METRICS {
            let (source, handle) = ManualSource::new(name, initial);
            sampler.add_source(Box::new(source))?;
            handles.insert(name.to_string(), handle);
        }

        Ok(Self {
            monitor: Monitor::with_evaluator(context, sampler, evaluator)?,
            handles,
            registry,
            now: Utc::now(),
            step,
        })
    }

    pub fn handle(&self, name: &str) -> Option<&ManualHandle> {
        self.handles.get(name)
    }

    /// Set every source to `value`.
    pub fn set_all(&self, value: f64) {
        for handle in self.handles.values() {
            handle.set(value);
        }
    }

    /// Advance the clock one step and tick.
    pub async fn tick(&mut self) -> TickReport {
        self.now += self.step;
        self.monitor.tick_at(self.now).await
    }

    /// Tick `n` times, returning every report.
    pub async fn run(&mut self, n: usize) -> Vec<TickReport> {
        let mut reports = Vec::with_capacity(n);
        for _ in 0..n {
            reports.push(self.tick().await);
        }
        reports
    }
}
