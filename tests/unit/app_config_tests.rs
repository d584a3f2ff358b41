/*!
 * Tests for configuration loading and validation
 */

use anyhow::Result;
use batchloc::app_config::{Config, LogLevel, ReviewProvider};
use crate::common;

/// Test that a config file on disk is loaded with defaults for omitted sections
#[test]
fn test_fromFile_withPartialConfig_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "languages": {"primary": "en", "secondary": "de", "target": "fr"},
            "memory": {"path": "/tmp/tm.json", "update": true},
            "review": {"enabled": true, "provider": "anthropic", "model": "claude-3-5-sonnet-latest"},
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::from_file(&path)?;

    assert_eq!(config.languages.allowed_sources(), vec!["en".to_string(), "de".to_string()]);
    assert!(config.memory.update);
    assert_eq!(config.review.provider, ReviewProvider::Anthropic);
    assert_eq!(config.review.max_tokens, 4000);
    assert_eq!(config.batching.bulk_batch_size, 330);
    assert_eq!(config.log_level, LogLevel::Debug);

    Ok(())
}

/// Test that a malformed file is reported as an error
#[test]
fn test_fromFile_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ languages: ")?;

    assert!(Config::from_file(&path).is_err());

    Ok(())
}

/// Test the ladder settings derived for each pass
#[test]
fn test_batchingLadders_shouldUsePassBatchSizes() {
    let mut config = Config::default();
    config.batching.review_batch_size = 5;
    config.batching.review_delay_ms = 250;

    let bulk = config.batching.bulk_ladder();
    let review = config.batching.review_ladder();

    assert_eq!(bulk.batch_size, 330);
    assert_eq!(bulk.inter_batch_delay_ms, 0);
    assert_eq!(review.batch_size, 5);
    assert_eq!(review.inter_batch_delay_ms, 250);
    assert_eq!(review.max_retries, 3);
}

/// Test that invalid settings are rejected even without credentials
#[test]
fn test_validateSettings_withInvalidValues_shouldFail() {
    let mut zero_batch = Config::default();
    zero_batch.batching.harmonization_batch_size = 0;
    assert!(zero_batch.validate_settings().is_err());

    let mut bad_secondary = Config::default();
    bad_secondary.languages.secondary = Some("klingon".to_string());
    assert!(bad_secondary.validate_settings().is_err());

    let mut bad_endpoint = Config::default();
    bad_endpoint.review.enabled = true;
    bad_endpoint.review.endpoint = "localhost without scheme".to_string();
    assert!(bad_endpoint.validate_settings().is_err());
}

/// Test provider names round-trip through strings
#[test]
fn test_reviewProvider_fromStr_shouldIgnoreCase() -> Result<()> {
    assert_eq!("OpenAI".parse::<ReviewProvider>()?, ReviewProvider::OpenAI);
    assert_eq!("ANTHROPIC".parse::<ReviewProvider>()?, ReviewProvider::Anthropic);
    assert!("ollama".parse::<ReviewProvider>().is_err());
    assert_eq!(ReviewProvider::Anthropic.to_string(), "anthropic");

    Ok(())
}
