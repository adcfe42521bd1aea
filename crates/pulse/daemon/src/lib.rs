//! Pulse daemon library
//!
//! Components for the `pulsed` binary:
//! - Layered configuration
//! - Simulated metric sources
//! - REST API over monitor status, queued events and Prometheus metrics
//! - Server lifecycle management

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod sources;

pub use config::{DaemonConfig, MonitorSpec, SourceConfig};
pub use error::{ApiError, DaemonError, DaemonResult};
pub use server::Server;
pub use sources::SimulatedSource;
