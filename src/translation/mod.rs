/*!
 * Batch localization engine.
 *
 * - `fingerprint`: content fingerprints of normalized text
 * - `memory`: persistent translation memory keyed by language pair and fingerprint
 * - `document`: translation units, rendered results and corpus loading
 * - `language_gate`: source language detection in front of the translator
 * - `batch`: the retry and fallback ladder shared by every pass
 * - `prompts`: system prompts and transcripts for the chat passes
 * - `response`: lenient parsing of chat replies
 * - `pipeline`: the passes and the run orchestrator
 */

pub mod batch;
pub mod document;
pub mod fingerprint;
pub mod language_gate;
pub mod memory;
pub mod pipeline;
pub mod prompts;
pub mod response;

pub use self::batch::{BatchOutcome, BatchStep, FallbackLadder, LadderConfig, LadderStats};
pub use self::document::{Corpus, Document, Origin, RenderedText, TranslationMap, TranslationUnit};
pub use self::fingerprint::{ContentFingerprint, fingerprint};
pub use self::language_gate::LanguageValidatingTranslator;
pub use self::memory::{MemoryKey, MemoryStats, TranslationMemory};
pub use self::pipeline::{
    BatchOrchestrator, HarmonizationEngine, ReviewPass, RunOutcome, RunSummary, TranslationPipeline,
};
