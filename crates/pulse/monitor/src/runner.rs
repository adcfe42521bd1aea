//! Periodic driver for a [`Monitor`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time::{interval, MissedTickBehavior};

use crate::monitor::{Monitor, StatusHandle};
use crate::queue::EventQueue;

/// Shared stop flag, checked once per tick.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the runner to stop after its current tick.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Ticks a monitor at its configured rate until stopped.
pub struct MonitorRunner {
    monitor: Monitor,
    stop: StopHandle,
}

impl MonitorRunner {
    pub fn new(monitor: Monitor) -> Self {
        Self {
            monitor,
            stop: StopHandle::new(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn status_handle(&self) -> StatusHandle {
        self.monitor.status_handle()
    }

    pub fn events(&self) -> EventQueue {
        self.monitor.context().events.clone()
    }

    /// Run until the stop flag is set, then hand the monitor back.
    ///
    /// Ticks that overrun the interval delay the next one rather than
    /// bursting to catch up.
    pub async fn run(self) -> Monitor {
        let Self { mut monitor, stop } = self;
        let period = match monitor.context().config.tick_interval() {
            Ok(period) => period,
            Err(e) => {
                tracing::error!(monitor = %monitor.name(), error = %e, "Monitor not started");
                return monitor;
            }
        };
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            monitor = %monitor.name(),
            period_ms = period.as_millis() as u64,
            "Monitor started"
        );

        loop {
            ticker.tick().await;
            if stop.is_stopped() {
                break;
            }
            monitor.tick().await;
        }

        tracing::info!(
            monitor = %monitor.name(),
            ticks = monitor.status().tick,
            "Monitor stopped"
        );
        monitor
    }
}
