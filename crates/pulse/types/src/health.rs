//! Ordinal health classifications.

use serde::{Deserialize, Serialize};

/// Health band of a composite score.
///
/// Ordered from worst to best so that `min()` over a set of bands yields the
/// worst one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    /// Below the adequate cut point.
    NeedsAttention,
    /// At or above the adequate cut point.
    Adequate,
    /// At or above the good cut point.
    Good,
    /// At or above the optimal cut point.
    Optimal,
}

impl std::fmt::Display for HealthBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthBand::NeedsAttention => write!(f, "needs-attention"),
            HealthBand::Adequate => write!(f, "adequate"),
            HealthBand::Good => write!(f, "good"),
            HealthBand::Optimal => write!(f, "optimal"),
        }
    }
}

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// One step more severe, saturating at `Critical`.
    pub fn escalate(self) -> Self {
        match self {
            Severity::Low => Severity::Medium,
            Severity::Medium => Severity::High,
            Severity::High | Severity::Critical => Severity::Critical,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}
