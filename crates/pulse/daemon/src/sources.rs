//! Simulated metric sources for the daemon.

use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pulse_monitor::{MetricSource, MonitorError, MonitorResult};
use rand::Rng;

use crate::config::SourceConfig;

/// Sine wave around a baseline with uniform noise and random dropouts.
pub struct SimulatedSource {
    config: SourceConfig,
    started: Instant,
}

impl SimulatedSource {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config,
            started: Instant::now(),
        }
    }

    /// Value at `elapsed` seconds, or `None` on a dropout.
    fn next_value(&self, elapsed: f64) -> Option<f64> {
        let mut rng = rand::thread_rng();
        if self.config.dropout > 0.0 && rng.gen_bool(self.config.dropout) {
            return None;
        }
        let wave = self.config.amplitude * (TAU * elapsed / self.config.period_secs).sin();
        let noise = if self.config.noise > 0.0 {
            rng.gen_range(-self.config.noise..=self.config.noise)
        } else {
            0.0
        };
        Some((self.config.baseline + wave + noise).clamp(0.0, 1.0))
    }
}

#[async_trait]
impl MetricSource for SimulatedSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn read(&self) -> MonitorResult<f64> {
        let value = self.next_value(self.started.elapsed().as_secs_f64());
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
        value.ok_or_else(|| MonitorError::SampleUnavailable {
            source_name: self.config.name.clone(),
            reason: "simulated dropout".into(),
        })
    }
}
