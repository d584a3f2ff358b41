/*!
 * Batch processing with a fallback ladder.
 *
 * Every upstream step (bulk translation, review, harmonization) runs its work
 * through the same ladder:
 *
 * 1. submit a batch
 * 2. on failure, retry the whole batch with exponential backoff
 * 3. once the retry budget is spent, process each item on its own
 * 4. anything still missing gets its fallback value
 *
 * The ladder never fails: the caller always gets one result per submitted item.
 */

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use rand::Rng;

use crate::errors::BatchFailure;

use super::document::RenderedText;

/// Result of one batch or single-item attempt
#[derive(Debug)]
pub enum BatchOutcome {
    /// The upstream answered; ids it did not cover are back-filled by the ladder
    Success(HashMap<String, RenderedText>),

    /// Nothing usable came back
    Failure(BatchFailure),
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// One upstream step that can be driven by the [`FallbackLadder`]
#[async_trait]
pub trait BatchStep: Send + Sync {
    /// Work item submitted upstream
    type Item: Send + Sync;

    /// Stable id of an item; result maps are keyed by it
    fn item_id<'a>(&self, item: &'a Self::Item) -> &'a str;

    /// Best known value for an item when the upstream gives nothing
    fn fallback_value(&self, item: &Self::Item) -> String;

    /// Submit a batch of items
    async fn attempt_batch(&self, items: &[Self::Item]) -> BatchOutcome;

    /// Submit a single item after the batch budget is exhausted
    async fn attempt_single(&self, item: &Self::Item) -> BatchOutcome {
        self.attempt_batch(std::slice::from_ref(item)).await
    }
}

/// Ladder tuning
#[derive(Debug, Clone)]
pub struct LadderConfig {
    /// Items per batch
    pub batch_size: usize,

    /// Attempts per batch before falling back to single items
    pub max_retries: usize,

    /// Base backoff, doubled after every failed attempt
    pub retry_backoff_ms: u64,

    /// Upper bound of random jitter added to each backoff
    pub retry_jitter_ms: u64,

    /// Fixed pause between consecutive batches
    pub inter_batch_delay_ms: u64,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_retries: 3,
            retry_backoff_ms: 1000,
            retry_jitter_ms: 0,
            inter_batch_delay_ms: 0,
        }
    }
}

impl LadderConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Delay before the attempt following `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let shift = attempt.saturating_sub(1).min(16) as u32;
        let base = self.retry_backoff_ms.saturating_mul(1u64 << shift);
        let jitter = if self.retry_jitter_ms > 0 {
            rand::rng().random_range(0..=self.retry_jitter_ms)
        } else {
            0
        };
        Duration::from_millis(base + jitter)
    }
}

/// Counters collected while running the ladder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LadderStats {
    /// Batches submitted
    pub batches: usize,

    /// Batch attempts, including retries
    pub batch_attempts: usize,

    /// Retries after a failed batch attempt
    pub retries: usize,

    /// Batches that exhausted their budget and went item by item
    pub degraded_batches: usize,

    /// Single-item attempts
    pub single_attempts: usize,

    /// Items that received their fallback value
    pub back_filled: usize,
}

impl LadderStats {
    /// Add another run's counters
    pub fn merge(&mut self, other: &LadderStats) {
        self.batches += other.batches;
        self.batch_attempts += other.batch_attempts;
        self.retries += other.retries;
        self.degraded_batches += other.degraded_batches;
        self.single_attempts += other.single_attempts;
        self.back_filled += other.back_filled;
    }
}

/// Everything the ladder produced for one run
#[derive(Debug, Default)]
pub struct LadderRun {
    /// One result per submitted item id
    pub results: HashMap<String, RenderedText>,

    pub stats: LadderStats,
}

/// Drives a [`BatchStep`] through batching, retries and per-item fallback
#[derive(Debug, Clone, Default)]
pub struct FallbackLadder {
    config: LadderConfig,
}

impl FallbackLadder {
    pub fn new(config: LadderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LadderConfig {
        &self.config
    }

    /// Run every item through the ladder
    pub async fn run<S: BatchStep>(&self, step: &S, items: &[S::Item]) -> LadderRun {
        let mut run = LadderRun::default();
        if items.is_empty() {
            return run;
        }

        let batch_size = self.config.batch_size.max(1);
        let max_attempts = self.config.max_retries.max(1);
        let total_batches = items.len().div_ceil(batch_size);

        for (batch_idx, chunk) in items.chunks(batch_size).enumerate() {
            if batch_idx > 0 && self.config.inter_batch_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.inter_batch_delay_ms)).await;
            }

            info!("Processing batch {}/{} ({} items)", batch_idx + 1, total_batches, chunk.len());
            run.stats.batches += 1;

            let mut answered = None;
            for attempt in 1..=max_attempts {
                run.stats.batch_attempts += 1;
                match step.attempt_batch(chunk).await {
                    BatchOutcome::Success(map) => {
                        answered = Some(map);
                        break;
                    }
                    BatchOutcome::Failure(reason) => {
                        error!(
                            "Batch {}/{} failed: {} - attempt {}/{}",
                            batch_idx + 1,
                            total_batches,
                            reason,
                            attempt,
                            max_attempts
                        );
                        if attempt < max_attempts {
                            run.stats.retries += 1;
                            tokio::time::sleep(self.config.backoff_delay(attempt)).await;
                        }
                    }
                }
            }

            match answered {
                Some(mut map) => {
                    for item in chunk {
                        let id = step.item_id(item);
                        match map.remove(id) {
                            Some(result) => {
                                run.results.insert(id.to_string(), result);
                            }
                            None => {
                                warn!("Missing result for '{}', keeping prior value", id);
                                self.back_fill(step, item, &mut run);
                            }
                        }
                    }
                }
                None => {
                    warn!(
                        "Batch {}/{} exhausted {} attempts, processing {} items individually",
                        batch_idx + 1,
                        total_batches,
                        max_attempts,
                        chunk.len()
                    );
                    run.stats.degraded_batches += 1;
                    self.run_singles(step, chunk, &mut run).await;
                }
            }
        }

        // Completeness sweep
        for item in items {
            if !run.results.contains_key(step.item_id(item)) {
                warn!("No result recorded for '{}', keeping prior value", step.item_id(item));
                self.back_fill(step, item, &mut run);
            }
        }

        run
    }

    async fn run_singles<S: BatchStep>(&self, step: &S, chunk: &[S::Item], run: &mut LadderRun) {
        for item in chunk {
            let id = step.item_id(item);
            run.stats.single_attempts += 1;

            match step.attempt_single(item).await {
                BatchOutcome::Success(mut map) => match map.remove(id) {
                    Some(result) => {
                        run.results.insert(id.to_string(), result);
                    }
                    None => {
                        debug!("Single attempt for '{}' returned no value", id);
                        self.back_fill(step, item, run);
                    }
                },
                BatchOutcome::Failure(reason) => {
                    warn!("Single attempt for '{}' failed: {}", id, reason);
                    self.back_fill(step, item, run);
                }
            }
        }
    }

    fn back_fill<S: BatchStep>(&self, step: &S, item: &S::Item, run: &mut LadderRun) {
        run.stats.back_filled += 1;
        run.results.insert(
            step.item_id(item).to_string(),
            RenderedText::back_filled(step.fallback_value(item)),
        );
    }
}
