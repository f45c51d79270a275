//! Bounded-concurrency driver that validates a whole pool

use crate::proxy::models::{Candidate, FailureReason, ValidationOutcome, WorkingProxy};
use crate::proxy::validator::Validate;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Default number of concurrent validations
pub const DEFAULT_MAX_WORKERS: usize = 30;

/// Aggregated outcomes of one run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Number of candidates that reached a terminal state
    pub attempted: usize,
    /// Candidates that worked, in completion order unless sorted
    pub working: Vec<WorkingProxy>,
    /// Failure counts keyed by reason kind
    pub failures: BTreeMap<&'static str, usize>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the terminal outcome of one candidate
    pub fn record(&mut self, candidate: Candidate, outcome: ValidationOutcome) {
        self.attempted += 1;
        match outcome {
            ValidationOutcome::Working { latency } => {
                self.working.push(WorkingProxy::new(candidate, latency));
            }
            ValidationOutcome::Failed { reason } => {
                *self.failures.entry(reason.kind()).or_insert(0) += 1;
            }
        }
    }

    pub fn working_count(&self) -> usize {
        self.working.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.values().sum()
    }

    /// Percentage of attempted candidates that worked
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.working.len() as f64 / self.attempted as f64 * 100.0
    }

    /// Sort the result set by ascending latency
    pub fn sort_by_latency(&mut self) {
        self.working.sort_by_key(|p| p.latency);
    }
}

/// Runs a validator over every candidate with at most `max_workers` in flight
pub struct Coordinator<V> {
    validator: Arc<V>,
    max_workers: usize,
}

impl<V: Validate + 'static> Coordinator<V> {
    /// A worker count of zero is treated as one
    pub fn new(validator: V, max_workers: usize) -> Self {
        Self {
            validator: Arc::new(validator),
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Validate every candidate and collect the outcomes
    pub async fn run(&self, candidates: &[Candidate]) -> RunReport {
        self.run_with_progress(candidates, |_, _| {}).await
    }

    /// Validate every candidate, calling `on_outcome` as each one finishes
    ///
    /// The callback runs on the collecting task, one outcome at a time.
    pub async fn run_with_progress<F>(&self, candidates: &[Candidate], mut on_outcome: F) -> RunReport
    where
        F: FnMut(&Candidate, &ValidationOutcome),
    {
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut report = RunReport::new();

        debug!(
            candidates = candidates.len(),
            workers = self.max_workers,
            "starting validation"
        );

        let mut outcomes = stream::iter(candidates.iter().cloned())
            .map(|candidate| {
                let sem = Arc::clone(&semaphore);
                let validator = Arc::clone(&self.validator);
                async move {
                    let Ok(permit) = sem.acquire_owned().await else {
                        let reason = FailureReason::Other("worker pool closed".to_string());
                        return (candidate, ValidationOutcome::failed(reason));
                    };

                    let task_candidate = candidate.clone();
                    let handle = tokio::spawn(async move {
                        let _permit = permit;
                        validator.validate(&task_candidate).await
                    });

                    let outcome = match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            warn!(proxy = %candidate, error = %e, "validation task aborted");
                            ValidationOutcome::failed(FailureReason::Other(
                                "validation task aborted".to_string(),
                            ))
                        }
                    };
                    (candidate, outcome)
                }
            })
            .buffer_unordered(self.max_workers);

        while let Some((candidate, outcome)) = outcomes.next().await {
            on_outcome(&candidate, &outcome);
            report.record(candidate, outcome);
        }

        debug!(
            attempted = report.attempted,
            working = report.working_count(),
            "validation finished"
        );
        report
    }
}
