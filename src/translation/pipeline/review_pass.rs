/*!
 * Review pass for existing translations.
 *
 * Each batch of (source, current translation) pairs is sent to a chat model
 * that returns an improved or unchanged text per block id. The pass uses the
 * same fallback ladder as the translation pass, and every item without a
 * usable answer keeps its current translation.
 */

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};

use crate::providers::ChatBackend;
use crate::translation::batch::{BatchOutcome, BatchStep, FallbackLadder, LadderConfig, LadderStats};
use crate::translation::document::{RenderedText, TranslationMap, TranslationUnit};
use crate::translation::prompts::{PromptLanguages, PromptTemplate, ReviewEntry, restore_line_breaks, review_transcript};
use crate::translation::response::{parse_id_map, single_answer};

/// Default number of entries per review call
pub const DEFAULT_REVIEW_BATCH_SIZE: usize = 10;

/// One translation submitted for review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub token: String,
    pub tag: Option<String>,
    pub source: String,
    pub current: String,
}

impl ReviewItem {
    pub fn new(token: impl Into<String>, source: impl Into<String>, current: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            tag: None,
            source: source.into(),
            current: current.into(),
        }
    }

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    /// Pair every unit with its current translation from `map`.
    ///
    /// Units missing from `map` are reviewed against their source text.
    pub fn from_units(units: &[TranslationUnit], map: &TranslationMap) -> Vec<Self> {
        units
            .iter()
            .map(|unit| {
                let current = map.get(&unit.token).cloned().unwrap_or_else(|| unit.source_text.clone());
                Self::new(&unit.token, &unit.source_text, current).with_tag(unit.grouping_tag.clone())
            })
            .collect()
    }
}

/// Statistics from the review pass
#[derive(Debug, Clone, Default)]
pub struct ReviewStats {
    /// Items submitted
    pub total: usize,

    /// Items whose final text differs from the current translation
    pub improved: usize,

    /// Items that kept their current translation
    pub unchanged: usize,

    pub ladder: LadderStats,
}

/// Output of [`ReviewPass::review`]
#[derive(Debug, Clone, Default)]
pub struct ReviewReport {
    /// Final text for every submitted token
    pub results: TranslationMap,

    pub stats: ReviewStats,
}

/// LLM review of existing translations
#[derive(Debug, Clone)]
pub struct ReviewPass {
    reviewer: Arc<dyn ChatBackend>,
    languages: PromptLanguages,
    system_prompt: String,
    ladder: FallbackLadder,
}

impl ReviewPass {
    pub fn new(reviewer: Arc<dyn ChatBackend>, languages: PromptLanguages) -> Self {
        let system_prompt = PromptTemplate::review().render(&languages);
        Self {
            reviewer,
            languages,
            system_prompt,
            ladder: FallbackLadder::new(LadderConfig {
                inter_batch_delay_ms: 1000,
                ..LadderConfig::default().with_batch_size(DEFAULT_REVIEW_BATCH_SIZE)
            }),
        }
    }

    pub fn with_ladder(mut self, config: LadderConfig) -> Self {
        self.ladder = FallbackLadder::new(config);
        self
    }

    /// Review every item; the result has exactly one entry per item
    pub async fn review(&self, items: &[ReviewItem]) -> ReviewReport {
        let mut report = ReviewReport::default();
        report.stats.total = items.len();

        if items.is_empty() {
            return report;
        }

        info!("Reviewing {} translations", items.len());
        let run = self.ladder.run(self, items).await;
        report.stats.ladder = run.stats;

        let mut results = run.results;
        for item in items {
            let text = results
                .remove(&item.token)
                .map(|rendered| rendered.text)
                .unwrap_or_else(|| item.current.clone());

            if text == item.current {
                report.stats.unchanged += 1;
            } else {
                report.stats.improved += 1;
            }
            report.results.insert(item.token.clone(), text);
        }

        info!(
            "Review complete: {} improved, {} unchanged",
            report.stats.improved, report.stats.unchanged
        );
        report
    }

    fn transcript(&self, items: &[ReviewItem]) -> String {
        let entries: Vec<ReviewEntry<'_>> = items
            .iter()
            .map(|item| ReviewEntry {
                id: &item.token,
                tag: item.tag.as_deref(),
                source: &item.source,
                current: &item.current,
            })
            .collect();
        review_transcript(&entries, &self.languages)
    }
}

#[async_trait]
impl BatchStep for ReviewPass {
    type Item = ReviewItem;

    fn item_id<'a>(&self, item: &'a ReviewItem) -> &'a str {
        &item.token
    }

    fn fallback_value(&self, item: &ReviewItem) -> String {
        item.current.clone()
    }

    async fn attempt_batch(&self, items: &[ReviewItem]) -> BatchOutcome {
        let response = match self.reviewer.complete(&self.system_prompt, &self.transcript(items)).await {
            Ok(response) => response,
            Err(e) => return BatchOutcome::Failure(e.into()),
        };

        match parse_id_map(&response) {
            Ok(mut answers) => BatchOutcome::Success(
                items
                    .iter()
                    .filter_map(|item| {
                        let text = answers.remove(&item.token)?;
                        Some((item.token.clone(), RenderedText::translated(restore_line_breaks(&text))))
                    })
                    .collect(),
            ),
            Err(e) => BatchOutcome::Failure(e),
        }
    }

    async fn attempt_single(&self, item: &ReviewItem) -> BatchOutcome {
        let items = std::slice::from_ref(item);
        let response = match self.reviewer.complete(&self.system_prompt, &self.transcript(items)).await {
            Ok(response) => response,
            Err(e) => return BatchOutcome::Failure(e.into()),
        };

        let mut answers = HashMap::new();
        match single_answer(&response, &item.token) {
            Some(text) => {
                answers.insert(item.token.clone(), RenderedText::translated(restore_line_breaks(&text)));
            }
            None => warn!("Reviewer returned no text for '{}'", item.token),
        }
        BatchOutcome::Success(answers)
    }
}
