//! Error types for the pulse-monitor crate.

use thiserror::Error;

/// Errors raised by the monitoring pipeline.
///
/// Only configuration and metrics registration errors are fatal; every other
/// variant is recovered inside the tick and reported through status and logs.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A metric source could not be read.
    #[error("sample unavailable for {source_name}: {reason}")]
    SampleUnavailable { source_name: String, reason: String },

    /// A metric source did not answer within the per-call timeout.
    #[error("sample from {source_name} timed out after {timeout_ms}ms")]
    SampleTimeout { source_name: String, timeout_ms: u64 },

    /// A weight table references a metric with no sample this tick.
    #[error("composite {label} is missing input {metric}")]
    AggregationInputMissing { label: String, metric: String },

    /// Threshold evaluation failed.
    #[error("evaluator fault: {0}")]
    EvaluatorFault(String),

    /// A weight table failed validation.
    #[error("invalid weights for {label}: {reason}")]
    InvalidWeights { label: String, reason: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Event queue rejected an item.
    #[error("event queue full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// Metrics registration or encoding failed.
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl MonitorError {
    /// Whether the loop can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MonitorError::SampleUnavailable { .. }
                | MonitorError::SampleTimeout { .. }
                | MonitorError::AggregationInputMissing { .. }
                | MonitorError::EvaluatorFault(_)
                | MonitorError::QueueFull { .. }
        )
    }
}

/// Result type for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
