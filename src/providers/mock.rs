/*!
 * Mock backends for testing.
 *
 * - `MockTranslator` answers bulk translation calls from lookup tables
 * - `MockReviewer` answers chat calls with a JSON patch for the ids in the prompt
 *
 * Both can be scripted to fail, and clones share their call counters so a test
 * can hand one copy to the engine and inspect the other.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::ProviderError;

use super::{ChatBackend, Detection, TranslationBackend};

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TranslatorBehavior {
    /// Always succeeds
    Working,
    /// Fails the first `n` calls, then succeeds
    FailFirst(usize),
    /// Always fails with an error
    Failing,
    /// Succeeds but drops the last result
    ShortResponse,
}

/// Mock bulk translator
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: TranslatorBehavior,
    /// Detected language per input text
    languages: HashMap<String, String>,
    /// Translation per input text
    translations: HashMap<String, String>,
    /// Language reported for texts missing from `languages`
    default_language: String,
    call_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockTranslator {
    pub fn new(behavior: TranslatorBehavior) -> Self {
        Self {
            behavior,
            languages: HashMap::new(),
            translations: HashMap::new(),
            default_language: "EN".to_string(),
            call_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A translator that always succeeds
    pub fn working() -> Self {
        Self::new(TranslatorBehavior::Working)
    }

    /// A translator that always errors
    pub fn failing() -> Self {
        Self::new(TranslatorBehavior::Failing)
    }

    /// Report `language` when `text` is submitted
    pub fn with_language(mut self, text: impl Into<String>, language: impl Into<String>) -> Self {
        self.languages.insert(text.into(), language.into());
        self
    }

    /// Answer `translation` when `text` is submitted
    pub fn with_translation(mut self, text: impl Into<String>, translation: impl Into<String>) -> Self {
        self.translations.insert(text.into(), translation.into());
        self
    }

    /// Language reported for unknown texts
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every batch of texts received, in call order
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().clone()
    }

    /// Whether `text` was ever submitted
    pub fn was_submitted(&self, text: &str) -> bool {
        self.requests.lock().iter().any(|batch| batch.iter().any(|t| t == text))
    }

    fn detect(&self, text: &str, target_lang: &str) -> Detection {
        let language = self
            .languages
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default_language.clone());
        let translation = self
            .translations
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("[{}] {}", target_lang.to_uppercase(), text));
        Detection::new(language, translation)
    }
}

#[async_trait]
impl TranslationBackend for MockTranslator {
    async fn translate(&self, texts: &[String], target_lang: &str) -> Result<Vec<Detection>, ProviderError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(texts.to_vec());

        match self.behavior {
            TranslatorBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            TranslatorBehavior::FailFirst(n) if count < n => Err(ProviderError::ConnectionError(format!(
                "Simulated failure (request #{})",
                count + 1
            ))),
            TranslatorBehavior::ShortResponse => {
                let mut detections: Vec<_> = texts.iter().map(|t| self.detect(t, target_lang)).collect();
                detections.pop();
                Ok(detections)
            }
            _ => Ok(texts.iter().map(|t| self.detect(t, target_lang)).collect()),
        }
    }
}

/// Behavior mode for the mock reviewer
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewerBehavior {
    /// Answer with the configured patch, limited to ids in the prompt
    Working,
    /// Fails the first `n` calls, then behaves like `Working`
    FailFirst(usize),
    /// Always fails with an error
    Failing,
    /// Answers text that contains no JSON object
    Malformed,
    /// Always answers this exact text
    Fixed(String),
    /// Answers every review entry with the translation it was shown
    Echo,
}

/// Mock chat backend used for review and harmonization
#[derive(Debug, Clone)]
pub struct MockReviewer {
    behavior: ReviewerBehavior,
    /// Reply value per block id
    answers: HashMap<String, String>,
    call_count: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockReviewer {
    pub fn new(behavior: ReviewerBehavior) -> Self {
        Self {
            behavior,
            answers: HashMap::new(),
            call_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn working() -> Self {
        Self::new(ReviewerBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(ReviewerBehavior::Failing)
    }

    pub fn malformed() -> Self {
        Self::new(ReviewerBehavior::Malformed)
    }

    /// Reply `text` whenever `id` appears in a prompt
    pub fn with_answer(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.answers.insert(id.into(), text.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// User prompts received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    fn patch_for(&self, user_prompt: &str) -> String {
        let patch: serde_json::Map<String, serde_json::Value> = prompt_ids(user_prompt)
            .into_iter()
            .filter_map(|id| {
                self.answers
                    .get(&id)
                    .map(|text| (id, serde_json::Value::String(text.clone())))
            })
            .collect();
        format!("```json\n{}\n```", serde_json::Value::Object(patch))
    }
}

/// Patch mapping each review entry id to its current translation line, as shown
fn echo_patch(user_prompt: &str) -> String {
    let mut patch = serde_json::Map::new();
    for entry in user_prompt.split("\n\n") {
        let mut lines = entry.lines();
        let Some((id, _)) = lines.next().and_then(|line| line.split_once(" | ")) else {
            continue;
        };
        if let Some((_, current)) = lines.nth(1).and_then(|line| line.split_once(": ")) {
            patch.insert(id.trim().to_string(), serde_json::Value::String(current.to_string()));
        }
    }
    format!("```json\n{}\n```", serde_json::Value::Object(patch))
}

/// Block ids listed in a review or harmonization transcript
fn prompt_ids(user_prompt: &str) -> Vec<String> {
    user_prompt
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if let Some((id, _)) = line.split_once(" | ") {
                Some(id.trim().to_string())
            } else if line.ends_with('"') {
                line.split_once(" = \"").map(|(id, _)| id.trim().to_string())
            } else {
                None
            }
        })
        .collect()
}

#[async_trait]
impl ChatBackend for MockReviewer {
    async fn complete(&self, _system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(user_prompt.to_string());

        match &self.behavior {
            ReviewerBehavior::Failing => Err(ProviderError::RateLimitExceeded("Simulated rate limit".to_string())),
            ReviewerBehavior::FailFirst(n) if count < *n => {
                Err(ProviderError::ConnectionError(format!("Simulated failure (request #{})", count + 1)))
            }
            ReviewerBehavior::Malformed => Ok("I'm sorry, I can only answer in prose today.".to_string()),
            ReviewerBehavior::Fixed(text) => Ok(text.clone()),
            ReviewerBehavior::Echo => Ok(echo_patch(user_prompt)),
            _ => Ok(self.patch_for(user_prompt)),
        }
    }
}
