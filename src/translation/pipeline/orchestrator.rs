/*!
 * Pipeline orchestrator for one localization run.
 *
 * The orchestrator owns the translation memory for the duration of the run
 * and drives the passes in order:
 * 1. Translation Pass: memory lookups plus language-gated bulk translation
 * 2. Review Pass (optional): LLM review of the translations
 * 3. Harmonization Pass (optional): one translation per distinct source text
 *
 * The memory is flushed at the end when update mode is on, and the final
 * token map is written for the reinjection step when an output path is given.
 */

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::app_config::{Config, ReviewProvider};
use crate::file_utils::FileManager;
use crate::providers::anthropic::Anthropic;
use crate::providers::deepl::DeepL;
use crate::providers::openai::OpenAI;
use crate::providers::{ChatBackend, TranslationBackend};
use crate::translation::document::{Corpus, TranslationMap};
use crate::translation::language_gate::LanguageValidatingTranslator;
use crate::translation::memory::{MemoryStats, TranslationMemory};
use crate::translation::prompts::PromptLanguages;

use super::harmonization_pass::{HarmonizationEngine, HarmonizationReport};
use super::review_pass::{ReviewItem, ReviewPass, ReviewStats};
use super::translation_pass::{BatchOrchestrator, TranslationStats};

/// Summary of one run, logged at the end.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Units in the corpus
    pub units_total: usize,

    /// Translation pass statistics
    pub translation: TranslationStats,

    /// Review pass statistics, when it ran
    pub review: Option<ReviewStats>,

    /// Harmonization report, when it ran
    pub harmonization: Option<HarmonizationReport>,

    /// Memory counters after the run
    pub memory: MemoryStats,

    /// Whether the memory store was written
    pub memory_flushed: bool,

    /// Wall-clock time of the run
    pub duration: Duration,
}

impl RunSummary {
    /// Batches that had to fall back to item-by-item processing, over all passes
    pub fn degraded_batches(&self) -> usize {
        self.translation.ladder.degraded_batches
            + self.review.as_ref().map_or(0, |r| r.ladder.degraded_batches)
            + self.harmonization.as_ref().map_or(0, |h| h.ladder.degraded_batches)
    }

    fn log(&self) {
        info!(
            "Run finished in {:.1}s: {} units, {} from memory ({:.1}%), {} translated, {} unchanged, {} back-filled",
            self.duration.as_secs_f64(),
            self.units_total,
            self.translation.cache_hits,
            self.translation.cache_hit_rate(),
            self.translation.translated,
            self.translation.unchanged,
            self.translation.back_filled
        );
        if let Some(review) = &self.review {
            info!("Review: {} improved, {} unchanged", review.improved, review.unchanged);
        }
        if let Some(harmonization) = &self.harmonization {
            info!(
                "Harmonization: {} of {} duplicate groups updated ({} units)",
                harmonization.groups_updated, harmonization.groups_total, harmonization.units_updated
            );
        }
        if self.degraded_batches() > 0 {
            warn!("{} batches degraded to item-by-item processing", self.degraded_batches());
        }
        info!(
            "Translation memory: {} entries{}",
            self.memory.entries,
            if self.memory_flushed { ", saved" } else { "" }
        );
    }
}

/// Result of [`TranslationPipeline::run`]
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final text for every unit token
    pub translations: TranslationMap,

    pub summary: RunSummary,
}

/// Runs the passes over a corpus
#[derive(Debug)]
pub struct TranslationPipeline {
    config: Config,
    translator: Arc<dyn TranslationBackend>,
    reviewer: Option<Arc<dyn ChatBackend>>,
}

impl TranslationPipeline {
    /// Create a pipeline with explicit backends.
    ///
    /// Credentials are not checked here since the backends are already built.
    pub fn new(config: Config, translator: Arc<dyn TranslationBackend>, reviewer: Option<Arc<dyn ChatBackend>>) -> Result<Self> {
        config.validate_settings()?;
        Ok(Self { config, translator, reviewer })
    }

    /// Create a pipeline with the HTTP backends described by `config`
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;

        let translation = &config.translation;
        let translator: Arc<dyn TranslationBackend> = Arc::new(DeepL::new(
            translation.get_api_key(),
            translation.endpoint.clone(),
            translation.timeout_secs,
        ));

        let review = &config.review;
        let reviewer: Option<Arc<dyn ChatBackend>> = if config.needs_reviewer() {
            let backend: Arc<dyn ChatBackend> = match review.provider {
                ReviewProvider::OpenAI => Arc::new(
                    OpenAI::new(review.get_api_key(), review.endpoint.clone(), review.model.clone(), review.timeout_secs)
                        .with_temperature(review.temperature)
                        .with_max_tokens(review.max_tokens),
                ),
                ReviewProvider::Anthropic => Arc::new(
                    Anthropic::new(review.get_api_key(), review.endpoint.clone(), review.model.clone(), review.timeout_secs)
                        .with_temperature(review.temperature)
                        .with_max_tokens(review.max_tokens),
                ),
            };
            info!(
                "Using {} ({}) for {}",
                review.provider.display_name(),
                review.model,
                if review.enabled { "review" } else { "harmonization" }
            );
            Some(backend)
        } else {
            None
        };

        Ok(Self { config, translator, reviewer })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a chat backend is available to the review and harmonization passes
    pub fn has_reviewer(&self) -> bool {
        self.reviewer.is_some()
    }

    fn prompt_languages(&self) -> PromptLanguages {
        let languages = &self.config.languages;
        PromptLanguages::new(
            languages.primary.clone().unwrap_or_else(|| "the source language".to_string()),
            languages.secondary.clone(),
            languages.target.clone(),
        )
    }

    /// Run every pass over `corpus`.
    ///
    /// Upstream failures only degrade the result; a memory store or output
    /// file that cannot be written fails the run.
    pub async fn run(&self, corpus: &Corpus, output: Option<&Path>) -> Result<RunOutcome> {
        let start = Instant::now();
        let config = &self.config;
        let units = corpus.units();

        info!(
            "Localizing {} units from {} documents into {}",
            units.len(),
            corpus.documents().len(),
            config.languages.target
        );

        let mut memory = TranslationMemory::load(&config.memory.path);

        // Translation pass
        let gate = LanguageValidatingTranslator::new(
            Arc::clone(&self.translator),
            config.languages.target.clone(),
            config.languages.allowed_sources(),
        )
        .with_batch_size(config.batching.bulk_batch_size);
        let orchestrator = BatchOrchestrator::new(gate)
            .with_ladder(config.batching.bulk_ladder())
            .with_primary_language(config.languages.primary.clone())
            .with_memory_updates(config.memory.update);

        let report = orchestrator.translate(&mut memory, &units).await;
        let mut translations = report.results;
        let mut summary = RunSummary {
            units_total: units.len(),
            translation: report.stats,
            ..RunSummary::default()
        };

        // Review pass
        match (&self.reviewer, config.review.enabled) {
            (Some(reviewer), true) => {
                let pass = ReviewPass::new(Arc::clone(reviewer), self.prompt_languages())
                    .with_ladder(config.batching.review_ladder());
                let items = ReviewItem::from_units(&units, &translations);
                let review = pass.review(&items).await;
                translations.extend(review.results);
                summary.review = Some(review.stats);
            }
            (None, true) => warn!("Review enabled but no reviewer configured, skipping"),
            _ => {}
        }

        // Harmonization pass
        if config.harmonization.enabled {
            let engine = match &self.reviewer {
                Some(reviewer) => HarmonizationEngine::new(Arc::clone(reviewer), &self.prompt_languages())
                    .with_ladder(config.batching.harmonization_ladder()),
                None => HarmonizationEngine::local(),
            }
            .with_label_length(config.harmonization.label_length);

            summary.harmonization = Some(engine.harmonize(&units, &mut translations).await);
        }

        summary.memory_flushed = memory.flush_if_enabled(&config.memory.path, config.memory.update)?;
        summary.memory = memory.stats();

        if let Some(path) = output {
            FileManager::write_json_atomic(path, &translations)
                .with_context(|| format!("Failed to write translations to {:?}", path))?;
            info!("Saved {} translations to {:?}", translations.len(), path);
        }

        summary.duration = start.elapsed();
        summary.log();

        Ok(RunOutcome { translations, summary })
    }
}
