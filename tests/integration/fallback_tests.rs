/*!
 * Retry and fallback behavior against failing providers
 */

use std::sync::Arc;

use anyhow::Result;
use batchloc::providers::mock::{MockReviewer, MockTranslator, ReviewerBehavior, TranslatorBehavior};
use batchloc::translation::{
    BatchOrchestrator, LanguageValidatingTranslator, Origin, ReviewPass, TranslationMemory, TranslationPipeline,
};
use batchloc::translation::pipeline::ReviewItem;
use batchloc::translation::prompts::PromptLanguages;
use crate::common;

fn orchestrator(backend: &MockTranslator, batch_size: usize) -> BatchOrchestrator {
    let translator = LanguageValidatingTranslator::new(Arc::new(backend.clone()), "fr", vec!["en".to_string()]);
    BatchOrchestrator::new(translator)
        .with_ladder(common::fast_ladder(batch_size))
        .with_primary_language(Some("en".to_string()))
        .with_memory_updates(true)
}

/// Test that an always-failing batch is tried exactly three times, then item by item
#[tokio::test]
async fn test_translate_withAlwaysFailingBackend_shouldExhaustBudgetThenFallBack() {
    let backend = MockTranslator::failing();
    let units = common::units(&[("A", "Log in"), ("B", "Material"), ("C", "Height")]);
    let mut memory = TranslationMemory::new();

    let report = orchestrator(&backend, 330).translate(&mut memory, &units).await;

    assert_eq!(report.stats.ladder.batch_attempts, 3);
    assert_eq!(report.stats.ladder.degraded_batches, 1);
    assert_eq!(report.stats.ladder.single_attempts, 3);
    // three batch calls plus one call per unit
    assert_eq!(backend.call_count(), 6);

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.results["B"], "Material");
    assert_eq!(report.origins["B"], Origin::BackFilled);
    assert!(memory.is_empty());
}

/// Test that a transient failure is retried within the batch budget
#[tokio::test]
async fn test_translate_withTwoTransientFailures_shouldSucceedOnThirdAttempt() {
    let backend = MockTranslator::new(TranslatorBehavior::FailFirst(2)).with_translation("Log in", "Se connecter");
    let units = common::units(&[("A", "Log in")]);
    let mut memory = TranslationMemory::new();

    let report = orchestrator(&backend, 330).translate(&mut memory, &units).await;

    assert_eq!(report.results["A"], "Se connecter");
    assert_eq!(report.stats.ladder.retries, 2);
    assert_eq!(report.stats.ladder.degraded_batches, 0);
    assert_eq!(memory.len(), 1);
}

/// Test that a short provider reply is treated as a failed batch
#[tokio::test]
async fn test_translate_withShortResponse_shouldBackFillEveryUnit() {
    let backend = MockTranslator::new(TranslatorBehavior::ShortResponse);
    let units = common::units(&[("A", "Log in"), ("B", "Material")]);
    let mut memory = TranslationMemory::new();

    let report = orchestrator(&backend, 330).translate(&mut memory, &units).await;

    assert_eq!(report.stats.ladder.degraded_batches, 1);
    assert_eq!(report.stats.back_filled, 2);
    assert_eq!(report.results["A"], "Log in");
}

/// Test that only the failing batch degrades when the corpus spans several batches
#[tokio::test]
async fn test_translate_withSeveralBatches_shouldCoverEveryUnit() {
    let backend = MockTranslator::new(TranslatorBehavior::FailFirst(3));
    let units = common::units(&[("A", "Log in"), ("B", "Material"), ("C", "Height"), ("D", "Width")]);
    let mut memory = TranslationMemory::new();

    let report = orchestrator(&backend, 2).translate(&mut memory, &units).await;

    assert_eq!(report.stats.ladder.batches, 2);
    assert_eq!(report.stats.ladder.degraded_batches, 1);
    assert_eq!(report.results.len(), 4);
    assert_eq!(report.results["D"], "[FR] Width");
}

/// Test that a prose reply to a single-item review replaces the translation verbatim
#[tokio::test]
async fn test_review_withMalformedReplies_shouldUseSingleReplyVerbatim() {
    let reviewer = MockReviewer::malformed();
    let pass = ReviewPass::new(Arc::new(reviewer.clone()), PromptLanguages::new("English", None, "French"))
        .with_ladder(common::fast_ladder(10));
    let items = vec![ReviewItem::new("A", "Log in", "Se connecter")];

    let report = pass.review(&items).await;

    assert_eq!(report.results["A"], "I'm sorry, I can only answer in prose today.");
    assert_eq!(report.stats.improved, 1);
    assert_eq!(report.stats.unchanged, 0);
    assert_eq!(report.stats.ladder.batch_attempts, 3);
    assert_eq!(reviewer.call_count(), 4);
}

/// Test that a single-item JSON reply without the block id keeps the current translation
#[tokio::test]
async fn test_review_withSingleReplyMissingId_shouldKeepCurrentTranslation() {
    // batch attempts fail, then the single call answers an empty patch
    let reviewer = MockReviewer::new(ReviewerBehavior::FailFirst(3));
    let pass = ReviewPass::new(Arc::new(reviewer.clone()), PromptLanguages::new("English", None, "French"))
        .with_ladder(common::fast_ladder(10));
    let items = vec![ReviewItem::new("A", "Log in", "Se connecter")];

    let report = pass.review(&items).await;

    assert_eq!(report.results["A"], "Se connecter");
    assert_eq!(report.stats.improved, 0);
    assert_eq!(report.stats.unchanged, 1);
    assert_eq!(report.stats.ladder.single_attempts, 1);
    assert_eq!(report.stats.ladder.back_filled, 1);
    assert_eq!(reviewer.call_count(), 4);
}

/// Test that an unwritable memory store fails the run
#[tokio::test]
async fn test_run_withUnwritableMemory_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config(&temp_dir);
    // a directory cannot be replaced by the store file
    config.memory.path = temp_dir.path().to_path_buf();

    let pipeline = TranslationPipeline::new(config, Arc::new(MockTranslator::working()), None)?;
    let result = pipeline.run(&common::corpus(&[("A", "Log in")]), None).await;

    assert!(result.is_err());

    Ok(())
}
