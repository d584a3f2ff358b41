/*!
 * Common test utilities for the batchloc test suite
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use batchloc::app_config::Config;
use batchloc::translation::{Corpus, LadderConfig, TranslationUnit};

/// Routes library logs to the test output; `RUST_LOG=debug` shows the pass details
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Ladder settings without any sleeping
pub fn fast_ladder(batch_size: usize) -> LadderConfig {
    LadderConfig {
        batch_size,
        max_retries: 3,
        retry_backoff_ms: 0,
        retry_jitter_ms: 0,
        inter_batch_delay_ms: 0,
    }
}

/// Configuration for an en -> fr run with its memory inside `dir`
pub fn test_config(dir: &TempDir) -> Config {
    init_test_logging();
    let mut config = Config::default();
    config.languages.primary = Some("en".to_string());
    config.languages.target = "fr".to_string();
    config.memory.path = dir.path().join("memory").join("translation_memory.json");
    config.memory.update = true;
    config.batching.retry_backoff_ms = 0;
    config.batching.review_delay_ms = 0;
    config
}

/// Builds units from (token, text) pairs
pub fn units(pairs: &[(&str, &str)]) -> Vec<TranslationUnit> {
    pairs.iter().map(|(token, text)| TranslationUnit::new(*token, *text)).collect()
}

/// Single-document corpus from (token, text) pairs
pub fn corpus(pairs: &[(&str, &str)]) -> Corpus {
    Corpus::from_units("page.json", units(pairs)).expect("test corpus has no token conflicts")
}
