#![deny(unsafe_code)]
//! # pulse-monitor
//!
//! Periodic metric sampling and threshold alerting.
//!
//! Every tick a [`Monitor`] runs one pass of the pipeline:
//!
//! - **Sample**: read each [`MetricSource`] under a timeout, falling back to the
//!   last known good value
//! - **Aggregate**: combine samples into composite scores with fixed weights
//! - **Evaluate**: classify each composite into a health band and severity
//! - **Track**: move issues through `Active → Resolving → Resolved → Purged`
//!
//! The latest [`StatusSnapshot`](pulse_types::StatusSnapshot) is published
//! through a [`StatusHandle`]; issue transitions are handed to other loops
//! through a bounded [`EventQueue`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use pulse_monitor::{
//!     ManualSource, MetricsRegistry, Monitor, MonitorConfig, MonitorContext, MonitorRunner,
//!     Sampler, WeightTable,
//! };
//!
//! # async fn run() -> pulse_monitor::MonitorResult<()> {
//! let registry = MetricsRegistry::new()?;
//! let config = MonitorConfig::new(
//!     "service",
//!     vec![WeightTable::new("overall")
//!         .with_weight("cpu", 0.6)
//!         .with_weight("latency", 0.4)],
//! );
//! let context = MonitorContext::new(config, registry.metrics())?;
//!
//! let (cpu, cpu_handle) = ManualSource::new("cpu", 0.9);
//! let (latency, _latency_handle) = ManualSource::new("latency", 0.8);
//! let sampler = Sampler::new(context.config.sampler.clone())
//!     .with_source(cpu)?
//!     .with_source(latency)?;
//!
//! let runner = MonitorRunner::new(Monitor::new(context, sampler)?);
//! let status = runner.status_handle();
//! let stop = runner.stop_handle();
//! let task = tokio::spawn(runner.run());
//!
//! cpu_handle.set(0.3);
//! println!("{:?}", status.get_status().bands);
//! stop.stop();
//! let _monitor = task.await;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod history;
pub mod metrics;
pub mod monitor;
pub mod queue;
pub mod runner;
pub mod sampler;
pub mod stability;
pub mod tracker;

pub use aggregator::{Aggregation, Aggregator};
pub use config::{
    AggregationConfig, EventQueueConfig, MonitorConfig, SamplerConfig, ThresholdConfig,
    TrackerConfig, WeightTable, MAX_TICK_RATE_HZ, MIN_TICK_RATE_HZ, WEIGHT_SUM_EPSILON,
};
pub use context::MonitorContext;
pub use error::{MonitorError, MonitorResult};
pub use evaluator::{Evaluate, Evaluation, EvaluationInput, Signal, ThresholdEvaluator};
pub use history::{HistoryBuffer, HistoryStore};
pub use metrics::{MetricsRegistry, PulseMetrics};
pub use monitor::{Monitor, StatusHandle, TickReport};
pub use queue::{Backpressure, BoundedQueue, EventQueue};
pub use runner::{MonitorRunner, StopHandle};
pub use sampler::{ManualHandle, ManualSource, MetricSource, SampleSet, Sampler};
pub use stability::StabilityReport;
pub use tracker::AlertTracker;
