/*!
 * Translation pass: memory lookups plus batched upstream translation.
 *
 * Units whose fingerprint is already in the translation memory are served
 * from it and never reach the upstream service. The remaining units go through
 * the language gate in batches driven by the fallback ladder, so every unit
 * ends up in the result map even when the upstream misbehaves.
 */

use log::{debug, info};

use crate::translation::batch::{FallbackLadder, LadderConfig, LadderStats};
use crate::translation::document::{Origin, RenderedText, TranslationMap, TranslationUnit};
use crate::translation::language_gate::{DEFAULT_BULK_BATCH_SIZE, LanguageValidatingTranslator};
use crate::translation::memory::{MemoryKey, TranslationMemory};

/// Statistics from the translation pass.
#[derive(Debug, Clone, Default)]
pub struct TranslationStats {
    /// Units submitted to the pass
    pub units_total: usize,

    /// Units served from translation memory
    pub cache_hits: usize,

    /// Units translated upstream
    pub translated: usize,

    /// Units passed through by the language gate
    pub unchanged: usize,

    /// Units that kept their source text after a failure or omission
    pub back_filled: usize,

    /// Entries written to translation memory
    pub memory_writes: usize,

    /// Batch and retry counters
    pub ladder: LadderStats,
}

impl TranslationStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of units served from memory, in percent.
    pub fn cache_hit_rate(&self) -> f32 {
        if self.units_total == 0 {
            return 0.0;
        }
        (self.cache_hits as f32 / self.units_total as f32) * 100.0
    }

    fn record(&mut self, origin: Origin) {
        match origin {
            Origin::Cached => self.cache_hits += 1,
            Origin::Translated => self.translated += 1,
            Origin::Unchanged => self.unchanged += 1,
            Origin::BackFilled => self.back_filled += 1,
        }
    }
}

/// Output of [`BatchOrchestrator::translate`]
#[derive(Debug, Clone, Default)]
pub struct OrchestrationReport {
    /// Text for every submitted token
    pub results: TranslationMap,

    /// Where each token's text came from
    pub origins: std::collections::HashMap<String, Origin>,

    pub stats: TranslationStats,
}

/// Batch orchestrator driving the language gate against translation memory
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    translator: LanguageValidatingTranslator,
    ladder: FallbackLadder,
    primary_language: Option<String>,
    update_memory: bool,
}

impl BatchOrchestrator {
    /// Create an orchestrator with the default bulk ladder settings
    pub fn new(translator: LanguageValidatingTranslator) -> Self {
        Self {
            translator,
            ladder: FallbackLadder::new(LadderConfig::default().with_batch_size(DEFAULT_BULK_BATCH_SIZE)),
            primary_language: None,
            update_memory: false,
        }
    }

    pub fn with_ladder(mut self, config: LadderConfig) -> Self {
        self.ladder = FallbackLadder::new(config);
        self
    }

    /// Primary source language used in memory keys (`any` when unset)
    pub fn with_primary_language(mut self, language: Option<String>) -> Self {
        self.primary_language = language;
        self
    }

    /// Write fresh translations back into memory
    pub fn with_memory_updates(mut self, update_memory: bool) -> Self {
        self.update_memory = update_memory;
        self
    }

    fn memory_key(&self, unit: &TranslationUnit) -> MemoryKey {
        MemoryKey::for_text(
            self.primary_language.as_deref(),
            self.translator.target_language(),
            &unit.source_text,
        )
    }

    /// Translate `units`, consulting and updating `memory`.
    ///
    /// The result map always has exactly one entry per input token.
    pub async fn translate(&self, memory: &mut TranslationMemory, units: &[TranslationUnit]) -> OrchestrationReport {
        let mut report = OrchestrationReport::default();
        report.stats.units_total = units.len();

        let mut misses = Vec::new();
        for unit in units {
            let key = self.memory_key(unit);
            match memory.lookup(&key) {
                Some(cached) => {
                    let cached = RenderedText::new(cached, Origin::Cached);
                    self.record(&mut report, &unit.token, cached);
                }
                None => misses.push(unit.clone()),
            }
        }

        info!(
            "{} units: {} served from memory, {} to translate",
            units.len(),
            units.len() - misses.len(),
            misses.len()
        );

        if !misses.is_empty() {
            let run = self.ladder.run(&self.translator, &misses).await;
            report.stats.ladder = run.stats;

            let mut results = run.results;
            for unit in &misses {
                let rendered = results
                    .remove(&unit.token)
                    .unwrap_or_else(|| RenderedText::back_filled(&unit.source_text));

                if self.update_memory && rendered.is_fresh() {
                    memory.put(&self.memory_key(unit), rendered.text.clone());
                    report.stats.memory_writes += 1;
                }

                self.record(&mut report, &unit.token, rendered);
            }
        }

        debug!(
            "Translation pass: {} translated, {} unchanged, {} back-filled",
            report.stats.translated, report.stats.unchanged, report.stats.back_filled
        );

        report
    }

    fn record(&self, report: &mut OrchestrationReport, token: &str, rendered: RenderedText) {
        report.stats.record(rendered.origin);
        report.origins.insert(token.to_string(), rendered.origin);
        report.results.insert(token.to_string(), rendered.text);
    }
}
