//! Prometheus metrics for monitor loops.
//!
//! A single [`PulseMetrics`] is shared by every monitor in a process; each
//! series carries a `monitor` label.

use std::sync::Arc;

use prometheus::core::Collector;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use pulse_types::IssueTransition;

use crate::error::{MonitorError, MonitorResult};

/// Metrics recorded by the monitor loop.
pub struct PulseMetrics {
    /// Completed ticks
    pub ticks_total: IntCounterVec,

    /// Wall-clock tick duration
    pub tick_duration_seconds: HistogramVec,

    /// Failed source reads by reason
    pub sample_failures_total: IntCounterVec,

    /// Latest composite value
    pub composite_score: GaugeVec,

    /// Issues currently active or resolving
    pub active_issues: IntGaugeVec,

    /// Issue transitions by kind and target state
    pub issue_transitions_total: IntCounterVec,

    /// Evaluator faults by composite
    pub evaluator_faults_total: IntCounterVec,

    /// Transitions lost to queue backpressure
    pub events_lost_total: IntCounterVec,

    /// 1 while sampling is degraded
    pub monitoring_degraded: IntGaugeVec,
}

impl PulseMetrics {
    /// Create and register all collectors.
    pub fn new(registry: &Registry) -> MonitorResult<Self> {
        let ticks_total = register(
            registry,
            IntCounterVec::new(Opts::new("ticks_total", "Completed monitor ticks"), &["monitor"])?,
        )?;

        let tick_duration_seconds = register(
            registry,
            HistogramVec::new(
                HistogramOpts::new("tick_duration_seconds", "Monitor tick duration")
                    .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0]),
                &["monitor"],
            )?,
        )?;

        let sample_failures_total = register(
            registry,
            IntCounterVec::new(
                Opts::new("sample_failures_total", "Failed metric source reads"),
                &["monitor", "source", "reason"],
            )?,
        )?;

        let composite_score = register(
            registry,
            GaugeVec::new(
                Opts::new("composite_score", "Latest composite score"),
                &["monitor", "label"],
            )?,
        )?;

        let active_issues = register(
            registry,
            IntGaugeVec::new(
                Opts::new("active_issues", "Issues active or resolving"),
                &["monitor"],
            )?,
        )?;

        let issue_transitions_total = register(
            registry,
            IntCounterVec::new(
                Opts::new("issue_transitions_total", "Issue lifecycle transitions"),
                &["monitor", "kind", "state"],
            )?,
        )?;

        let evaluator_faults_total = register(
            registry,
            IntCounterVec::new(
                Opts::new("evaluator_faults_total", "Threshold evaluation faults"),
                &["monitor", "label"],
            )?,
        )?;

        let events_lost_total = register(
            registry,
            IntCounterVec::new(
                Opts::new("events_lost_total", "Transitions lost to queue backpressure"),
                &["monitor"],
            )?,
        )?;

        let monitoring_degraded = register(
            registry,
            IntGaugeVec::new(
                Opts::new("monitoring_degraded", "Sampling degraded (1) or nominal (0)"),
                &["monitor"],
            )?,
        )?;

        Ok(Self {
            ticks_total,
            tick_duration_seconds,
            sample_failures_total,
            composite_score,
            active_issues,
            issue_transitions_total,
            evaluator_faults_total,
            events_lost_total,
            monitoring_degraded,
        })
    }

    pub fn record_tick(&self, monitor: &str, duration_secs: f64) {
        self.ticks_total.with_label_values(&[monitor]).inc();
        self.tick_duration_seconds
            .with_label_values(&[monitor])
            .observe(duration_secs);
    }

    pub fn record_sample_failure(&self, monitor: &str, error: &MonitorError) {
        let (source, reason) = match error {
            MonitorError::SampleUnavailable { source_name, .. } => (source_name.as_str(), "unavailable"),
            MonitorError::SampleTimeout { source_name, .. } => (source_name.as_str(), "timeout"),
            _ => ("unknown", "other"),
        };
        self.sample_failures_total
            .with_label_values(&[monitor, source, reason])
            .inc();
    }

    pub fn set_composite(&self, monitor: &str, label: &str, value: f64) {
        self.composite_score
            .with_label_values(&[monitor, label])
            .set(value);
    }

    pub fn set_active_issues(&self, monitor: &str, count: usize) {
        self.active_issues
            .with_label_values(&[monitor])
            .set(count as i64);
    }

    pub fn record_transition(&self, monitor: &str, transition: &IssueTransition) {
        let kind = transition.kind.to_string();
        let state = format!("{:?}", transition.to).to_lowercase();
        self.issue_transitions_total
            .with_label_values(&[monitor, &kind, &state])
            .inc();
    }

    pub fn record_evaluator_fault(&self, monitor: &str, label: &str) {
        self.evaluator_faults_total
            .with_label_values(&[monitor, label])
            .inc();
    }

    pub fn record_event_lost(&self, monitor: &str) {
        self.events_lost_total.with_label_values(&[monitor]).inc();
    }

    pub fn set_degraded(&self, monitor: &str, degraded: bool) {
        self.monitoring_degraded
            .with_label_values(&[monitor])
            .set(i64::from(degraded));
    }
}

fn register<C: Collector + Clone + 'static>(registry: &Registry, collector: C) -> MonitorResult<C> {
    registry.register(Box::new(collector.clone()))?;
    Ok(collector)
}

/// Registry owning the pulse collectors.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Arc<Registry>,
    metrics: Arc<PulseMetrics>,
}

impl MetricsRegistry {
    /// Registry with the default `pulse` prefix.
    pub fn new() -> MonitorResult<Self> {
        Self::with_prefix("pulse")
    }

    /// Registry whose metric names start with `prefix_`.
    pub fn with_prefix(prefix: &str) -> MonitorResult<Self> {
        let registry = Registry::new_custom(Some(prefix.to_string()), None)?;
        let metrics = PulseMetrics::new(&registry)?;
        Ok(Self {
            registry: Arc::new(registry),
            metrics: Arc::new(metrics),
        })
    }

    pub fn metrics(&self) -> Arc<PulseMetrics> {
        self.metrics.clone()
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Prometheus text exposition of every registered collector.
    pub fn export(&self) -> MonitorResult<String> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| MonitorError::Configuration(format!("metrics output is not UTF-8: {}", e)))
    }
}
