/*!
 * Review and harmonization passes against the mock chat backend
 */

use std::sync::Arc;

use batchloc::providers::mock::{MockReviewer, ReviewerBehavior};
use batchloc::translation::pipeline::{HarmonizationEngine, ReviewItem, ReviewPass, group_units};
use batchloc::translation::prompts::PromptLanguages;
use batchloc::translation::{TranslationMap, TranslationUnit};
use crate::common;

fn languages() -> PromptLanguages {
    PromptLanguages::new("English", Some("German".to_string()), "French")
}

fn map(pairs: &[(&str, &str)]) -> TranslationMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Test that every submitted item gets exactly one result across several batches
#[tokio::test]
async fn test_review_withSeveralBatches_shouldCoverEveryItem() {
    let reviewer = MockReviewer::working().with_answer("B", "Matériau").with_answer("E", "Largeur");
    let pass = ReviewPass::new(Arc::new(reviewer.clone()), languages()).with_ladder(common::fast_ladder(2));
    let items: Vec<ReviewItem> = ["A", "B", "C", "D", "E"]
        .iter()
        .map(|id| ReviewItem::new(*id, format!("source {}", id), format!("current {}", id)))
        .collect();

    let report = pass.review(&items).await;

    assert_eq!(report.results.len(), 5);
    assert_eq!(report.results["B"], "Matériau");
    assert_eq!(report.results["C"], "current C");
    assert_eq!(report.stats.improved, 2);
    assert_eq!(reviewer.call_count(), 3);
}

/// Test that the review transcript carries the tag and both texts
#[tokio::test]
async fn test_review_shouldSendTaggedTranscript() {
    let reviewer = MockReviewer::working();
    let pass = ReviewPass::new(Arc::new(reviewer.clone()), languages()).with_ladder(common::fast_ladder(10));
    let items = vec![ReviewItem::new("A", "Log in", "Connecter").with_tag(Some("button".to_string()))];

    pass.review(&items).await;

    let prompt = &reviewer.prompts()[0];
    assert!(prompt.contains("A | button"));
    assert!(prompt.contains("Log in"));
    assert!(prompt.contains("Connecter"));
}

/// Test the case-variant group: one review call, one agreed value
#[tokio::test]
async fn test_harmonize_withCaseVariants_shouldConvergeOnReviewerChoice() {
    let units = common::units(&[("A", "Height"), ("B", "height"), ("C", "HEIGHT ")]);
    let mut translations = map(&[("A", "Hauteur"), ("B", "hauteur"), ("C", "Hauteur")]);
    let reviewer = MockReviewer::working()
        .with_answer("A", "Hauteur")
        .with_answer("B", "Hauteur")
        .with_answer("C", "Hauteur");
    let engine = HarmonizationEngine::new(Arc::new(reviewer.clone()), &languages()).with_ladder(common::fast_ladder(10));

    let report = engine.harmonize(&units, &mut translations).await;

    assert_eq!(report.groups_total, 1);
    assert_eq!(report.units_updated, 1);
    assert_eq!(reviewer.call_count(), 1);
    assert!(translations.values().all(|value| value == "Hauteur"));
}

/// Test that an already consistent corpus never calls the reviewer
#[tokio::test]
async fn test_harmonize_withConsistentGroups_shouldSkipReview() {
    let units = common::units(&[("A", "Height"), ("B", "height"), ("C", "Width")]);
    let mut translations = map(&[("A", "Hauteur"), ("B", "Hauteur"), ("C", "Largeur")]);
    let reviewer = MockReviewer::working();
    let engine = HarmonizationEngine::new(Arc::new(reviewer.clone()), &languages());

    let report = engine.harmonize(&units, &mut translations).await;

    assert_eq!(report.groups_consistent, 1);
    assert!(!report.changed());
    assert_eq!(reviewer.call_count(), 0);
}

/// Test that a failing reviewer still leaves every group consistent
#[tokio::test]
async fn test_harmonize_withFailingReviewer_shouldUseLocalMajority() {
    let units = common::units(&[("A", "Height"), ("B", "height"), ("C", "Height")]);
    let mut translations = map(&[("A", "Hauteur"), ("B", "Taille"), ("C", "Hauteur")]);
    let reviewer = MockReviewer::failing();
    let engine = HarmonizationEngine::new(Arc::new(reviewer.clone()), &languages()).with_ladder(common::fast_ladder(10));

    let report = engine.harmonize(&units, &mut translations).await;

    assert_eq!(translations["B"], "Hauteur");
    assert_eq!(report.units_updated, 1);
    assert_eq!(report.ladder.degraded_batches, 1);
}

/// Test that the reviewer's value wins over the majority when it answers
#[tokio::test]
async fn test_harmonize_withReviewerPreferringMinority_shouldApplyIt() {
    let units = common::units(&[("A", "Log in"), ("B", "log in"), ("C", "Log in")]);
    let mut translations = map(&[("A", "Connexion"), ("B", "Se connecter"), ("C", "Connexion")]);
    let reviewer = MockReviewer::new(ReviewerBehavior::Working)
        .with_answer("A", "Se connecter")
        .with_answer("B", "Se connecter")
        .with_answer("C", "Se connecter");
    let engine = HarmonizationEngine::new(Arc::new(reviewer), &languages()).with_ladder(common::fast_ladder(10));

    let report = engine.harmonize(&units, &mut translations).await;

    assert_eq!(report.units_updated, 2);
    assert!(translations.values().all(|value| value == "Se connecter"));
}

/// Test that long texts are grouped by their full content, not the label
#[test]
fn test_groupUnits_withSharedPrefix_shouldKeepGroupsApart() {
    let prefix = "x".repeat(60);
    let units = vec![
        TranslationUnit::new("A", format!("{} one", prefix)),
        TranslationUnit::new("B", format!("{} two", prefix)),
    ];

    let groups = group_units(&units, &TranslationMap::new(), 50);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].label, groups[1].label);
    assert_ne!(groups[0].key, groups[1].key);
}
