//! Application state for API handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use pulse_monitor::{EventQueue, MetricsRegistry, StatusHandle};

/// Read-side handles for one running monitor
#[derive(Clone)]
pub struct MonitorHandles {
    pub status: StatusHandle,
    pub events: EventQueue,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Monitors by name
    pub monitors: Arc<BTreeMap<String, MonitorHandles>>,

    /// Metrics registry
    pub metrics: MetricsRegistry,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(monitors: BTreeMap<String, MonitorHandles>, metrics: MetricsRegistry) -> Self {
        Self {
            monitors: Arc::new(monitors),
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    pub fn monitor(&self, name: &str) -> Option<&MonitorHandles> {
        self.monitors.get(name)
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let secs = (chrono::Utc::now() - self.started_at).num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs < 86400 {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
        }
    }
}
