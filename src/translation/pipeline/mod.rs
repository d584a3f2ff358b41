/*!
 * Multi-pass localization pipeline.
 *
 * A run goes through three passes:
 * 1. **Translation Pass**: translation memory lookups, then language-gated bulk translation
 * 2. **Review Pass**: optional LLM review of every translation
 * 3. **Harmonization Pass**: one translation per distinct source text across the corpus
 */

pub mod harmonization_pass;
pub mod orchestrator;
pub mod review_pass;
pub mod translation_pass;

pub use harmonization_pass::{HarmonizationEngine, HarmonizationGroup, HarmonizationReport, group_units};
pub use orchestrator::{RunOutcome, RunSummary, TranslationPipeline};
pub use review_pass::{ReviewItem, ReviewPass, ReviewReport, ReviewStats};
pub use translation_pass::{BatchOrchestrator, OrchestrationReport, TranslationStats};
