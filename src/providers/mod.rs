/*!
 * Upstream service clients.
 *
 * The engine needs two capabilities, each behind its own trait:
 * - `TranslationBackend`: bulk machine translation with source language detection (DeepL)
 * - `ChatBackend`: a system/user prompt completion for review and harmonization (OpenAI, Anthropic)
 *
 * `mock` holds deterministic implementations of both for tests.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One translated text together with the language the service detected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Detected source language code as reported upstream (e.g. "EN")
    pub detected_source_lang: String,

    /// Translated text
    pub text: String,
}

impl Detection {
    pub fn new(detected_source_lang: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            detected_source_lang: detected_source_lang.into(),
            text: text.into(),
        }
    }
}

/// Bulk translation capability
///
/// Results are positional: the i-th detection belongs to the i-th input text.
/// The whole call either succeeds or fails.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Translate `texts` into `target_lang`, detecting each source language
    async fn translate(&self, texts: &[String], target_lang: &str) -> Result<Vec<Detection>, ProviderError>;
}

/// Chat completion capability used by the review and harmonization passes
#[async_trait]
pub trait ChatBackend: Send + Sync + Debug {
    /// Complete a conversation made of one system and one user message
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError>;
}

pub mod anthropic;
pub mod deepl;
pub mod mock;
pub mod openai;
