/*!
 * Tests for loading extractor output into a corpus
 */

use anyhow::Result;
use batchloc::translation::document::{Corpus, Document, parse_blocks, parse_units};
use crate::common;

/// Test that a directory of unit files becomes one corpus in path order
#[test]
fn test_loadDir_withTwoDocuments_shouldKeepOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(
        temp_dir.path(),
        "a_home.json",
        r#"{"login": "Log in", "title": {"source_text": "Welcome", "grouping_tag": "h1"}}"#,
    )?;
    common::create_test_file(temp_dir.path(), "b_product.json", r#"{"login": "Log in", "height": "Height"}"#)?;
    common::create_test_file(temp_dir.path(), "readme.txt", "ignored")?;

    let corpus = Corpus::load_dir(temp_dir.path())?;
    let tokens: Vec<String> = corpus.units().into_iter().map(|unit| unit.token).collect();

    assert_eq!(corpus.documents().len(), 2);
    assert_eq!(tokens, vec!["login", "title", "height"]);
    assert_eq!(corpus.unit_count(), 3);

    Ok(())
}

/// Test that a token reused with another text is rejected
#[test]
fn test_push_withConflictingToken_shouldFail() -> Result<()> {
    let mut corpus = Corpus::from_units("a.json", common::units(&[("A", "Height")]))?;

    let result = corpus.push(Document::new("b.json", common::units(&[("A", "Width")])));

    assert!(result.is_err());
    assert_eq!(corpus.documents().len(), 1);

    Ok(())
}

/// Test that a rejected document leaves no tokens behind
#[test]
fn test_push_withLateConflict_shouldRegisterNothing() -> Result<()> {
    let mut corpus = Corpus::from_units("a.json", common::units(&[("A", "Height")]))?;

    let rejected = corpus.push(Document::new("b.json", common::units(&[("B", "Material"), ("A", "Width")])));
    assert!(rejected.is_err());
    assert_eq!(corpus.unit_count(), 1);

    // B is still free for another text
    corpus.push(Document::new("c.json", common::units(&[("B", "Color")])))?;

    assert_eq!(corpus.unit_count(), 2);
    assert_eq!(corpus.documents().len(), 2);
    assert_eq!(corpus.units()[1].source_text, "Color");

    Ok(())
}

/// Test that one document reusing a token for two texts is rejected
#[test]
fn test_push_withConflictInsideDocument_shouldFail() {
    let mut corpus = Corpus::new();

    let result = corpus.push(Document::new("a.json", common::units(&[("A", "Height"), ("A", "Width")])));

    assert!(result.is_err());
    assert_eq!(corpus.unit_count(), 0);
    assert!(corpus.documents().is_empty());
}

/// Test unit records with grouping tags and parents
#[test]
fn test_parseUnits_withRecord_shouldKeepMetadata() -> Result<()> {
    let units = parse_units(r#"{"t1": {"source_text": "Price", "grouping_tag": "th", "parent_block_id": "table"}}"#)?;

    assert_eq!(units[0].source_text, "Price");
    assert_eq!(units[0].grouping_tag.as_deref(), Some("th"));
    assert_eq!(units[0].parent_block_id.as_deref(), Some("table"));

    Ok(())
}

/// Test that block segments become child units
#[test]
fn test_parseBlocks_withSegments_shouldFlattenThem() -> Result<()> {
    let units = parse_blocks(r#"{"intro": {"text": "Welcome", "segments": {"1": "Log in", "2": "Sign up"}}}"#)?;

    assert_eq!(units.len(), 3);
    assert_eq!(units[0].token, "intro");
    assert_eq!(units[1].token, "intro_1");
    assert_eq!(units[2].parent_block_id.as_deref(), Some("intro"));

    Ok(())
}

/// Test that non-object input is refused
#[test]
fn test_parseUnits_withArray_shouldFail() {
    assert!(parse_units(r#"["Log in"]"#).is_err());
    assert!(parse_blocks(r#"{"intro": {"segments": {"1": 3}}}"#).is_err());
}
