/*!
 * Language-gated bulk translation.
 *
 * Pages routinely mix languages; only text written in one of the configured
 * source languages is translated. Each batch costs up to two upstream calls:
 * one to detect the language of every (cleaned) text, and one to translate the
 * allowed texts in their original form. Everything else passes through.
 */

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::BatchFailure;
use crate::language_utils::is_allowed_language;
use crate::providers::TranslationBackend;

use super::batch::{BatchOutcome, BatchStep};
use super::document::{RenderedText, TranslationUnit};

/// Characters of cleaned text sent for language detection
pub const DETECTION_MAX_CHARS: usize = 500;

/// Default number of units per upstream call
pub const DEFAULT_BULK_BATCH_SIZE: usize = 330;

/// Leading `label:` on the first line
static LABEL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\n]*?:\s*").unwrap()
});

/// Anything that is not a letter, digit, whitespace, `=`, `+` or `-`
static NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{L}\p{N}\s=+\-]").unwrap()
});

/// Prepare text for language detection.
///
/// Drops a leading `label:` prefix, replaces symbols with spaces, collapses
/// whitespace and keeps at most [`DETECTION_MAX_CHARS`] characters.
pub fn clean_for_detection(text: &str) -> String {
    let without_label = LABEL_PREFIX.replace(text, "");
    let without_noise = NOISE.replace_all(&without_label, " ");
    without_noise
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(DETECTION_MAX_CHARS)
        .collect()
}

/// Translator that only translates units written in an allowed language
#[derive(Debug, Clone)]
pub struct LanguageValidatingTranslator {
    backend: Arc<dyn TranslationBackend>,
    target_language: String,
    allowed_languages: Vec<String>,
    batch_size: usize,
}

impl LanguageValidatingTranslator {
    /// Create a translator for `target_language` accepting `allowed_languages` as sources
    pub fn new(backend: Arc<dyn TranslationBackend>, target_language: impl Into<String>, allowed_languages: Vec<String>) -> Self {
        Self {
            backend,
            target_language: target_language.into(),
            allowed_languages,
            batch_size: DEFAULT_BULK_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn allowed_languages(&self) -> &[String] {
        &self.allowed_languages
    }

    /// Translate every unit; never fails.
    ///
    /// A batch whose upstream calls fail falls back to the original text of
    /// each of its units.
    pub async fn translate_units(&self, units: &[TranslationUnit]) -> Vec<RenderedText> {
        let mut results = Vec::with_capacity(units.len());
        let total_batches = units.len().div_ceil(self.batch_size);

        for (batch_idx, chunk) in units.chunks(self.batch_size).enumerate() {
            info!("Translating batch {}/{} ({} units)", batch_idx + 1, total_batches, chunk.len());
            match self.translate_batch(chunk).await {
                Ok(batch) => results.extend(batch),
                Err(e) => {
                    error!("Batch {}/{} failed, keeping original text: {}", batch_idx + 1, total_batches, e);
                    results.extend(chunk.iter().map(|unit| RenderedText::back_filled(&unit.source_text)));
                }
            }
        }

        results
    }

    /// Detect and translate one batch, positionally aligned with `units`
    pub async fn translate_batch(&self, units: &[TranslationUnit]) -> Result<Vec<RenderedText>, BatchFailure> {
        if units.is_empty() {
            return Ok(Vec::new());
        }

        let allowed = self.detect_allowed(units).await?;

        let to_translate: Vec<String> = units
            .iter()
            .zip(&allowed)
            .filter(|(_, allowed)| **allowed)
            .map(|(unit, _)| unit.source_text.clone())
            .collect();

        let mut translated = if to_translate.is_empty() {
            Vec::new().into_iter()
        } else {
            let detections = self.backend.translate(&to_translate, &self.target_language).await?;
            if detections.len() != to_translate.len() {
                return Err(BatchFailure::CountMismatch {
                    expected: to_translate.len(),
                    actual: detections.len(),
                });
            }
            detections.into_iter()
        };

        debug!("{} of {} units in an allowed language", to_translate.len(), units.len());

        Ok(units
            .iter()
            .zip(allowed)
            .map(|(unit, allowed)| match allowed.then(|| translated.next()).flatten() {
                Some(detection) => RenderedText::translated(detection.text),
                None => RenderedText::unchanged(&unit.source_text),
            })
            .collect())
    }

    async fn detect_allowed(&self, units: &[TranslationUnit]) -> Result<Vec<bool>, BatchFailure> {
        if self.allowed_languages.is_empty() {
            return Ok(vec![false; units.len()]);
        }

        let cleaned: Vec<String> = units.iter().map(|unit| clean_for_detection(&unit.source_text)).collect();
        let probe: Vec<String> = cleaned.iter().filter(|text| !text.is_empty()).cloned().collect();

        if probe.is_empty() {
            return Ok(vec![false; units.len()]);
        }

        let detections = self.backend.translate(&probe, &self.target_language).await?;
        if detections.len() != probe.len() {
            return Err(BatchFailure::CountMismatch {
                expected: probe.len(),
                actual: detections.len(),
            });
        }

        let mut detections = detections.into_iter();
        Ok(cleaned
            .iter()
            .map(|text| {
                if text.is_empty() {
                    return false;
                }
                detections
                    .next()
                    .map(|d| is_allowed_language(&d.detected_source_lang, &self.allowed_languages))
                    .unwrap_or(false)
            })
            .collect())
    }
}

#[async_trait]
impl BatchStep for LanguageValidatingTranslator {
    type Item = TranslationUnit;

    fn item_id<'a>(&self, item: &'a TranslationUnit) -> &'a str {
        &item.token
    }

    fn fallback_value(&self, item: &TranslationUnit) -> String {
        item.source_text.clone()
    }

    async fn attempt_batch(&self, items: &[TranslationUnit]) -> BatchOutcome {
        match self.translate_batch(items).await {
            Ok(results) => BatchOutcome::Success(
                items
                    .iter()
                    .map(|unit| unit.token.clone())
                    .zip(results)
                    .collect::<HashMap<_, _>>(),
            ),
            Err(e) => BatchOutcome::Failure(e),
        }
    }
}
