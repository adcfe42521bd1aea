//! API request handlers

mod health;
mod metrics;
mod monitors;

pub use health::*;
pub use metrics::*;
pub use monitors::*;
