//! Batch grading orchestrator.
//!
//! Grades many attempts with bounded parallelism. Each attempt is graded by
//! the pure statistics builder on the blocking pool; results are folded back
//! in input order so reports are deterministic.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::model::Attempt;
use crate::report::{GradeReport, GradedAttempt};

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct GradingEngineConfig {
    /// Maximum attempts graded concurrently.
    pub parallelism: usize,
}

impl Default for GradingEngineConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_attempt_graded(&self, graded: &GradedAttempt);
    fn on_attempt_error(&self, attempt_id: &str, error: &str);
    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_attempt_graded(&self, _: &GradedAttempt) {}
    fn on_attempt_error(&self, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// The batch grading engine.
pub struct GradingEngine {
    config: GradingEngineConfig,
}

impl GradingEngine {
    pub fn new(config: GradingEngineConfig) -> Self {
        Self { config }
    }

    /// Grade every attempt and build a report.
    pub async fn grade_all(
        &self,
        attempts: Vec<Attempt>,
        progress: &dyn ProgressReporter,
    ) -> Result<GradeReport> {
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));
        let total = attempts.len();

        let mut futures = FuturesUnordered::new();
        for (index, attempt) in attempts.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            futures.push(async move {
                let attempt_id = attempt.id.clone();
                let inner = async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    let graded =
                        tokio::task::spawn_blocking(move || GradedAttempt::grade(&attempt))
                            .await?;
                    Ok::<_, anyhow::Error>(graded)
                };
                (index, attempt_id, inner.await)
            });
        }

        let mut graded = Vec::with_capacity(total);
        let mut failed_attempts = Vec::new();

        while let Some((index, attempt_id, result)) = futures.next().await {
            match result {
                Ok(g) => {
                    progress.on_attempt_graded(&g);
                    graded.push((index, g));
                }
                Err(e) => {
                    tracing::error!("grading failed for attempt {attempt_id}: {e:#}");
                    progress.on_attempt_error(&attempt_id, &e.to_string());
                    failed_attempts.push((index, attempt_id));
                }
            }
        }

        graded.sort_by_key(|(index, _)| *index);
        failed_attempts.sort_by_key(|(index, _)| *index);

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, graded.len(), failed_attempts.len(), elapsed);
        tracing::info!(
            "graded {} of {} attempts in {}ms",
            graded.len(),
            total,
            elapsed.as_millis()
        );

        Ok(GradeReport::new(
            graded.into_iter().map(|(_, g)| g).collect(),
            failed_attempts.into_iter().map(|(_, id)| id).collect(),
            elapsed.as_millis() as u64,
        ))
    }
}
