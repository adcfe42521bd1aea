//! Issue records and their lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::health::Severity;
use crate::ids::IssueId;

/// What kind of condition an issue tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Composite score severity at or above the alert floor.
    LowScore,
    /// Composite history variance above the spike threshold.
    VarianceSpike,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::LowScore => write!(f, "low_score"),
            IssueKind::VarianceSpike => write!(f, "variance_spike"),
        }
    }
}

/// Lifecycle state of an issue.
///
/// ```text
/// (none) ──► Active ──► Resolving ──► Resolved ──► Purged
///              ▲            │
///              └────────────┘  (condition returned during dwell)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Active,
    Resolving,
    Resolved,
    Purged,
}

impl IssueState {
    /// Whether `self → next` is a legal edge of the lifecycle.
    pub fn can_transition_to(self, next: IssueState) -> bool {
        matches!(
            (self, next),
            (IssueState::Active, IssueState::Resolving)
                | (IssueState::Resolving, IssueState::Active)
                | (IssueState::Resolving, IssueState::Resolved)
                | (IssueState::Resolved, IssueState::Purged)
        )
    }

    /// Whether the issue still counts as open for deduplication.
    pub fn is_open(self) -> bool {
        matches!(self, IssueState::Active | IssueState::Resolving)
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueState::Active => write!(f, "active"),
            IssueState::Resolving => write!(f, "resolving"),
            IssueState::Resolved => write!(f, "resolved"),
            IssueState::Purged => write!(f, "purged"),
        }
    }
}

/// Coarse status exposed to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Active,
    Resolved,
}

/// A tracked issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier.
    pub id: IssueId,

    /// Condition kind.
    pub kind: IssueKind,

    /// Composite label the issue was raised for.
    pub label: String,

    /// Current severity, refreshed while the condition persists.
    pub severity: Severity,

    /// Time the issue was first detected.
    pub detected_at: DateTime<Utc>,

    /// Lifecycle state.
    pub state: IssueState,

    /// Start of the current dwell period, if resolving.
    pub resolving_since: Option<DateTime<Utc>>,

    /// Time the issue was resolved.
    pub resolved_at: Option<DateTime<Utc>>,

    /// Composite value at the most recent breach.
    pub last_value: f64,

    /// Human-readable description of the most recent breach.
    pub description: String,
}

impl Issue {
    /// Create a newly active issue.
    pub fn new(
        kind: IssueKind,
        label: impl Into<String>,
        severity: Severity,
        value: f64,
        description: impl Into<String>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: IssueId::generate(),
            kind,
            label: label.into(),
            severity,
            detected_at,
            state: IssueState::Active,
            resolving_since: None,
            resolved_at: None,
            last_value: value,
            description: description.into(),
        }
    }

    pub fn status(&self) -> IssueStatus {
        match self.state {
            IssueState::Active | IssueState::Resolving => IssueStatus::Active,
            IssueState::Resolved | IssueState::Purged => IssueStatus::Resolved,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }
}

/// A single lifecycle edge taken by an issue.
///
/// `from` is `None` when the issue was created on this edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueTransition {
    pub issue_id: IssueId,
    pub label: String,
    pub kind: IssueKind,
    pub severity: Severity,
    pub from: Option<IssueState>,
    pub to: IssueState,
    pub at: DateTime<Utc>,
}

impl IssueTransition {
    /// Whether this edge is legal.
    pub fn is_valid(&self) -> bool {
        match self.from {
            None => self.to == IssueState::Active,
            Some(from) => from.can_transition_to(self.to),
        }
    }
}
