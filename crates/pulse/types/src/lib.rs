#![deny(unsafe_code)]
//! # pulse-types
//!
//! Shared data model for the Pulse monitoring loop.
//!
//! - [`MetricSample`] / [`CompositeScore`]: per-tick readings and their weighted combinations
//! - [`HealthBand`] / [`Severity`]: ordinal classifications produced by evaluation
//! - [`Issue`] / [`IssueTransition`]: alert records and their lifecycle edges
//! - [`StatusSnapshot`]: read-only view published after every tick

pub mod health;
pub mod ids;
pub mod issue;
pub mod sample;
pub mod status;

pub use health::{HealthBand, Severity};
pub use ids::IssueId;
pub use issue::{Issue, IssueKind, IssueState, IssueStatus, IssueTransition};
pub use sample::{CompositeScore, MetricSample};
pub use status::{MonitoringHealth, StatusSnapshot};
