//! Read-only status snapshot published by a monitor.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::health::HealthBand;
use crate::issue::Issue;

/// Health of the monitoring pipeline itself, independent of the monitored system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MonitoringHealth {
    /// Every source is answering.
    Nominal,
    /// One or more sources exceeded the consecutive failure threshold.
    Degraded { failing_sources: Vec<String> },
}

/// Snapshot of a monitor after its most recent tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Monitor name.
    pub monitor: String,

    /// Latest composite values by label.
    pub composite_scores: BTreeMap<String, f64>,

    /// Latest health band by label.
    pub bands: BTreeMap<String, HealthBand>,

    /// Issues that are active or resolving.
    pub active_issues: Vec<Issue>,

    /// Number of ticks retained in history.
    pub history_depth: usize,

    /// Configured tick rate.
    pub tick_rate_hz: f64,

    /// Number of completed ticks.
    pub tick: u64,

    /// Completion time of the most recent tick, `None` before the first one.
    pub last_updated: Option<DateTime<Utc>>,

    /// Sampling pipeline health.
    pub monitoring: MonitoringHealth,

    /// Evaluator faults since start.
    pub evaluator_faults: u64,
}

impl StatusSnapshot {
    /// Empty snapshot for a monitor that has not ticked yet.
    pub fn initial(monitor: impl Into<String>, tick_rate_hz: f64) -> Self {
        Self {
            monitor: monitor.into(),
            composite_scores: BTreeMap::new(),
            bands: BTreeMap::new(),
            active_issues: Vec::new(),
            history_depth: 0,
            tick_rate_hz,
            tick: 0,
            last_updated: None,
            monitoring: MonitoringHealth::Nominal,
            evaluator_faults: 0,
        }
    }

    /// Sources are failing; scores may be built from last-known-good values.
    pub fn is_monitoring_degraded(&self) -> bool {
        matches!(self.monitoring, MonitoringHealth::Degraded { .. })
    }

    /// Some composite is in the lowest band or an issue is open.
    pub fn is_system_unhealthy(&self) -> bool {
        self.bands.values().any(|b| *b == HealthBand::NeedsAttention)
            || !self.active_issues.is_empty()
    }

    /// Worst band across all composites.
    pub fn worst_band(&self) -> Option<HealthBand> {
        self.bands.values().copied().min()
    }

    /// Whether the snapshot is older than `max_age` (or was never updated).
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        match self.last_updated {
            Some(updated) => now - updated > max_age,
            None => true,
        }
    }
}
