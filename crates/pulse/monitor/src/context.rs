//! Explicit per-monitor context.

use std::sync::Arc;

use crate::config::MonitorConfig;
use crate::error::MonitorResult;
use crate::metrics::PulseMetrics;
use crate::queue::EventQueue;

/// Everything a monitor needs from its surroundings.
///
/// Built once when a monitor is constructed and dropped when its runner
/// returns; nothing here is global.
#[derive(Clone)]
pub struct MonitorContext {
    pub config: Arc<MonitorConfig>,
    pub metrics: Arc<PulseMetrics>,
    pub events: EventQueue,
}

impl MonitorContext {
    /// Validate the configuration and create the event queue it describes.
    pub fn new(config: MonitorConfig, metrics: Arc<PulseMetrics>) -> MonitorResult<Self> {
        config.validate()?;
        let events = EventQueue::new(config.events.capacity, config.events.backpressure);
        Ok(Self {
            config: Arc::new(config),
            metrics,
            events,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }
}
