//! The monitor: one sample → aggregate → evaluate → track pass per tick.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use pulse_types::{CompositeScore, IssueTransition, MonitoringHealth, StatusSnapshot};
use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::aggregator::Aggregator;
use crate::context::MonitorContext;
use crate::error::{MonitorError, MonitorResult};
use crate::evaluator::{Evaluate, Evaluation, EvaluationInput, ThresholdEvaluator};
use crate::history::HistoryStore;
use crate::sampler::Sampler;
use crate::stability::StabilityReport;
use crate::tracker::AlertTracker;

/// What happened during one tick.
#[derive(Debug, Default)]
pub struct TickReport {
    pub tick: u64,
    pub scores: Vec<CompositeScore>,
    pub evaluations: Vec<Evaluation>,
    pub transitions: Vec<IssueTransition>,
    /// Source read failures, recovered or not.
    pub sample_failures: Vec<MonitorError>,
    /// Composite inputs replaced by the default value.
    pub missing_inputs: Vec<MonitorError>,
    /// Labels skipped because evaluation failed.
    pub evaluator_faults: Vec<MonitorError>,
}

impl TickReport {
    pub fn evaluation(&self, label: &str) -> Option<&Evaluation> {
        self.evaluations.iter().find(|e| e.label == label)
    }
}

/// Read-only view of a monitor's latest status.
#[derive(Debug, Clone)]
pub struct StatusHandle {
    rx: watch::Receiver<StatusSnapshot>,
}

impl StatusHandle {
    /// Latest published snapshot.
    pub fn get_status(&self) -> StatusSnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next published snapshot.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// A single monitoring loop body.
pub struct Monitor {
    context: MonitorContext,
    sampler: Sampler,
    aggregator: Aggregator,
    evaluator: Box<dyn Evaluate>,
    metric_history: HistoryStore,
    composite_history: HistoryStore,
    tracker: AlertTracker,
    status_tx: watch::Sender<StatusSnapshot>,
    tick: u64,
    evaluator_faults: u64,
}

impl Monitor {
    /// Build a monitor using the configured threshold evaluator.
    pub fn new(context: MonitorContext, sampler: Sampler) -> MonitorResult<Self> {
        let evaluator = ThresholdEvaluator::new(context.config.thresholds.clone());
        Self::with_evaluator(context, sampler, Box::new(evaluator))
    }

    /// Build a monitor with a custom evaluator.
    pub fn with_evaluator(
        context: MonitorContext,
        sampler: Sampler,
        evaluator: Box<dyn Evaluate>,
    ) -> MonitorResult<Self> {
        let config = context.config.clone();
        let aggregator = Aggregator::from_config(&config.aggregation)?;

        let known: Vec<&str> = sampler.source_names().collect();
        for table in aggregator.tables() {
            for metric in table.weights.keys() {
                if !known.contains(&metric.as_str()) {
                    warn!(
                        monitor = %config.name,
                        label = %table.label,
                        metric = %metric,
                        "Composite references a metric with no source"
                    );
                }
            }
        }

        let (status_tx, _) =
            watch::channel(StatusSnapshot::initial(config.name.clone(), config.tick_rate_hz));

        debug!(
            monitor = %config.name,
            sources = sampler.len(),
            composites = aggregator.tables().len(),
            "Monitor initialised"
        );

        Ok(Self {
            sampler,
            aggregator,
            evaluator,
            metric_history: HistoryStore::new(config.history_capacity),
            composite_history: HistoryStore::new(config.history_capacity),
            tracker: AlertTracker::new(config.tracker.clone()),
            status_tx,
            tick: 0,
            evaluator_faults: 0,
            context,
        })
    }

    pub fn name(&self) -> &str {
        self.context.name()
    }

    pub fn context(&self) -> &MonitorContext {
        &self.context
    }

    pub fn tracker(&self) -> &AlertTracker {
        &self.tracker
    }

    pub fn metric_history(&self) -> &HistoryStore {
        &self.metric_history
    }

    pub fn composite_history(&self) -> &HistoryStore {
        &self.composite_history
    }

    /// Tick using the wall clock.
    pub async fn tick(&mut self) -> TickReport {
        self.tick_at(Utc::now()).await
    }

    /// Run one tick as of `now`.
    pub async fn tick_at(&mut self, now: DateTime<Utc>) -> TickReport {
        let started = Instant::now();
        let monitor = self.context.config.name.clone();
        let metrics = self.context.metrics.clone();
        let min_samples = self.context.config.thresholds.stability_min_samples;

        let mut report = TickReport {
            tick: self.tick + 1,
            ..Default::default()
        };

        // Sample
        let set = self.sampler.sample(now).await;
        for failure in &set.failures {
            metrics.record_sample_failure(&monitor, failure);
        }
        for (name, sample) in &set.samples {
            self.metric_history.push(name, sample.value);
        }
        report.sample_failures = set.failures;

        // Aggregate
        let aggregation = self.aggregator.aggregate(&set.samples);
        for missing in &aggregation.missing {
            debug!(monitor = %monitor, error = %missing, "Composite input defaulted");
        }
        report.missing_inputs = aggregation.missing;

        for score in &aggregation.scores {
            self.composite_history.push(&score.label, score.value);
            metrics.set_composite(&monitor, &score.label, score.value);
        }

        // Evaluate and track
        for score in &aggregation.scores {
            let buffer = self.composite_history.get(&score.label);
            let trend = buffer.map(|b| b.trend()).unwrap_or(0.0);
            let stability = buffer.and_then(|b| StabilityReport::analyze(&b.values(), min_samples));

            let input = EvaluationInput {
                score,
                trend,
                stability: stability.as_ref(),
            };

            match self.evaluator.evaluate(&input) {
                Ok(evaluation) => {
                    report
                        .transitions
                        .extend(self.tracker.observe(&evaluation, now));
                    report.evaluations.push(evaluation);
                }
                Err(e) => {
                    error!(
                        monitor = %monitor,
                        label = %score.label,
                        error = %e,
                        "Evaluation failed; issues for this composite left unchanged"
                    );
                    self.evaluator_faults += 1;
                    metrics.record_evaluator_fault(&monitor, &score.label);
                    report.evaluator_faults.push(e);
                }
            }
        }
        // Purge waits for a tick whose evaluations all succeeded.
        if report.evaluator_faults.is_empty() {
            report.transitions.extend(self.tracker.sweep(now));
        } else {
            debug!(monitor = %monitor, "Purge deferred while evaluation is faulting");
        }

        // Publish transitions
        for transition in &report.transitions {
            metrics.record_transition(&monitor, transition);
            match self.context.events.push(transition.clone()) {
                Ok(None) => {}
                Ok(Some(evicted)) => {
                    metrics.record_event_lost(&monitor);
                    debug!(
                        monitor = %monitor,
                        issue_id = %evicted.issue_id,
                        "Event queue full, dropped oldest transition"
                    );
                }
                Err(e) => {
                    metrics.record_event_lost(&monitor);
                    warn!(monitor = %monitor, error = %e, "Transition rejected by event queue");
                }
            }
        }

        report.scores = aggregation.scores;
        self.tick = report.tick;

        let snapshot = self.snapshot(&report, now);
        metrics.set_active_issues(&monitor, snapshot.active_issues.len());
        metrics.set_degraded(&monitor, snapshot.is_monitoring_degraded());
        metrics.record_tick(&monitor, started.elapsed().as_secs_f64());
        self.status_tx.send_replace(snapshot);

        report
    }

    fn snapshot(&self, report: &TickReport, now: DateTime<Utc>) -> StatusSnapshot {
        let failing_sources = self.sampler.failing_sources();
        let monitoring = if failing_sources.is_empty() {
            MonitoringHealth::Nominal
        } else {
            MonitoringHealth::Degraded { failing_sources }
        };

        // Bands for faulted labels carry over from the previous snapshot.
        let mut bands = self.status_tx.borrow().bands.clone();
        for evaluation in &report.evaluations {
            bands.insert(evaluation.label.clone(), evaluation.band);
        }

        let composite_scores: BTreeMap<String, f64> = report
            .scores
            .iter()
            .map(|s| (s.label.clone(), s.value))
            .collect();

        StatusSnapshot {
            monitor: self.context.config.name.clone(),
            composite_scores,
            bands,
            active_issues: self.tracker.active_issues(),
            history_depth: self.metric_history.depth().max(self.composite_history.depth()),
            tick_rate_hz: self.context.config.tick_rate_hz,
            tick: self.tick,
            last_updated: Some(now),
            monitoring,
            evaluator_faults: self.evaluator_faults,
        }
    }

    /// Latest published snapshot.
    pub fn status(&self) -> StatusSnapshot {
        self.status_tx.borrow().clone()
    }

    /// Handle for reading status from other tasks.
    pub fn status_handle(&self) -> StatusHandle {
        StatusHandle {
            rx: self.status_tx.subscribe(),
        }
    }
}
