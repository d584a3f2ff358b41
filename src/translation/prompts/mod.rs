/*!
 * Prompt construction for the LLM-backed passes.
 *
 * This module provides:
 * - System prompt templates for review and harmonization
 * - Transcript builders for the user message
 */

pub mod templates;

pub use templates::{
    HarmonizationEntry, PromptLanguages, PromptTemplate, ReviewEntry, escape_line_breaks, harmonization_transcript,
    restore_line_breaks, review_transcript,
};
