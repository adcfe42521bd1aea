//! Issue lifecycle tracking.
//!
//! Owns every issue a monitor raises and moves it through
//! `Active → Resolving → Resolved → Purged`, one edge at a time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use pulse_types::{Issue, IssueId, IssueKind, IssueState, IssueTransition, Severity};
use tracing::{debug, error, info, warn};

use crate::config::TrackerConfig;
use crate::evaluator::{Evaluation, Signal};

/// Tracks issues keyed by id, deduplicated per `(label, kind)`.
#[derive(Debug)]
pub struct AlertTracker {
    config: TrackerConfig,
    issues: BTreeMap<IssueId, Issue>,
    /// Open issue per (label, kind).
    open: BTreeMap<(String, IssueKind), IssueId>,
    created_total: u64,
    purged_total: u64,
}

impl AlertTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            issues: BTreeMap::new(),
            open: BTreeMap::new(),
            created_total: 0,
            purged_total: 0,
        }
    }

    /// Apply one evaluation; returns the edges taken.
    pub fn observe(&mut self, evaluation: &Evaluation, now: DateTime<Utc>) -> Vec<IssueTransition> {
        let mut transitions = Vec::new();
        for (kind, signal) in &evaluation.signals {
            if let Some(t) = self.apply(&evaluation.label, *kind, signal, evaluation.value, now) {
                transitions.push(t);
            }
        }
        transitions
    }

    fn apply(
        &mut self,
        label: &str,
        kind: IssueKind,
        signal: &Signal,
        value: f64,
        now: DateTime<Utc>,
    ) -> Option<IssueTransition> {
        let key = (label.to_string(), kind);
        let open_id = self.open.get(&key).cloned();

        match (signal, open_id) {
            (Signal::Breach { severity, description }, None) => {
                let issue = Issue::new(kind, label, *severity, value, description.clone(), now);
                log_new_issue(&issue);
                let transition = transition(&issue, None, IssueState::Active, now);
                self.open.insert(key, issue.id.clone());
                self.issues.insert(issue.id.clone(), issue);
                self.created_total += 1;
                Some(transition)
            }
            (Signal::Breach { severity, description }, Some(id)) => {
                let issue = self.issues.get_mut(&id)?;
                issue.severity = *severity;
                issue.last_value = value;
                issue.description = description.clone();
                if issue.state == IssueState::Resolving {
                    debug!(issue_id = %issue.id, label, kind = %kind, "Condition returned during dwell");
                    issue.state = IssueState::Active;
                    issue.resolving_since = None;
                    return Some(transition(issue, Some(IssueState::Resolving), IssueState::Active, now));
                }
                None
            }
            (Signal::Clear, Some(id)) => {
                let issue = self.issues.get_mut(&id)?;
                match issue.state {
                    IssueState::Active => {
                        debug!(issue_id = %issue.id, label, kind = %kind, "Condition cleared, dwelling");
                        issue.state = IssueState::Resolving;
                        issue.resolving_since = Some(now);
                        Some(transition(issue, Some(IssueState::Active), IssueState::Resolving, now))
                    }
                    IssueState::Resolving => {
                        let since = issue.resolving_since.unwrap_or(now);
                        if now - since >= self.config.dwell() {
                            info!(
                                issue_id = %issue.id,
                                label,
                                kind = %kind,
                                "Issue resolved"
                            );
                            issue.state = IssueState::Resolved;
                            issue.resolved_at = Some(now);
                            let t = transition(issue, Some(IssueState::Resolving), IssueState::Resolved, now);
                            self.open.remove(&key);
                            Some(t)
                        } else {
                            None
                        }
                    }
                    IssueState::Resolved | IssueState::Purged => None,
                }
            }
            (Signal::Hold, _) | (Signal::Clear, None) => None,
        }
    }

    /// Drop issues resolved longer than the retention window.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> Vec<IssueTransition> {
        let retention = self.config.retention();
        let expired: Vec<IssueId> = self
            .issues
            .values()
            .filter(|issue| issue.state == IssueState::Resolved)
            .filter(|issue| issue.resolved_at.is_some_and(|at| now - at >= retention))
            .map(|issue| issue.id.clone())
            .collect();

        let mut transitions = Vec::with_capacity(expired.len());
        for id in expired {
            if let Some(mut issue) = self.issues.remove(&id) {
                issue.state = IssueState::Purged;
                debug!(issue_id = %issue.id, label = %issue.label, "Issue purged");
                transitions.push(transition(&issue, Some(IssueState::Resolved), IssueState::Purged, now));
                self.purged_total += 1;
            }
        }
        transitions
    }

    pub fn get(&self, id: &IssueId) -> Option<&Issue> {
        self.issues.get(id)
    }

    /// Open issue for a label and kind.
    pub fn open_issue(&self, label: &str, kind: IssueKind) -> Option<&Issue> {
        self.open
            .get(&(label.to_string(), kind))
            .and_then(|id| self.issues.get(id))
    }

    /// Active and resolving issues.
    pub fn active_issues(&self) -> Vec<Issue> {
        self.issues.values().filter(|i| i.is_open()).cloned().collect()
    }

    /// Every retained issue, including resolved ones awaiting purge.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.values()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn created_total(&self) -> u64 {
        self.created_total
    }

    pub fn purged_total(&self) -> u64 {
        self.purged_total
    }
}

fn transition(
    issue: &Issue,
    from: Option<IssueState>,
    to: IssueState,
    at: DateTime<Utc>,
) -> IssueTransition {
    IssueTransition {
        issue_id: issue.id.clone(),
        label: issue.label.clone(),
        kind: issue.kind,
        severity: issue.severity,
        from,
        to,
        at,
    }
}

fn log_new_issue(issue: &Issue) {
    match issue.severity {
        Severity::Critical => error!(
            issue_id = %issue.id,
            label = %issue.label,
            kind = %issue.kind,
            "Critical issue: {}",
            issue.description
        ),
        Severity::High => warn!(
            issue_id = %issue.id,
            label = %issue.label,
            kind = %issue.kind,
            "High severity issue: {}",
            issue.description
        ),
        Severity::Medium | Severity::Low => info!(
            issue_id = %issue.id,
            label = %issue.label,
            kind = %issue.kind,
            severity = %issue.severity,
            "Issue detected: {}",
            issue.description
        ),
    }
}
