/*!
 * # batchloc - batch localization with translation memory
 *
 * A Rust library that translates the text units of a document corpus into
 * one target language, with as few upstream calls as possible.
 *
 * ## Features
 *
 * - Persistent translation memory keyed by content fingerprint
 * - Source language gating: only allowed source languages are translated
 * - Batched calls with retries, backoff and item-by-item fallback
 * - Optional LLM review pass (OpenAI or Anthropic)
 * - Harmonization of duplicate source text across the corpus
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management
 * - `translation`: The localization engine:
 *   - `translation::memory`: Translation memory
 *   - `translation::language_gate`: Language-validating translator
 *   - `translation::batch`: Fallback ladder
 *   - `translation::pipeline`: Translation, review and harmonization passes
 * - `providers`: DeepL, OpenAI and Anthropic clients
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `logging`: Colored stderr logger
 * - `errors`: Custom error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod logging;
pub mod providers;
pub mod translation;

pub use app_config::Config;
pub use errors::{AppError, BatchFailure, MemoryError, ProviderError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use translation::{Corpus, TranslationMemory, TranslationPipeline, TranslationUnit};
