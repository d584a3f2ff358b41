/*!
 * Tests for the persistent translation memory
 */

use std::fs;

use anyhow::Result;
use batchloc::translation::{MemoryKey, TranslationMemory, fingerprint};
use crate::common;

/// Test that a flushed memory is found again after reloading
#[test]
fn test_flush_thenLoad_shouldKeepEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("tm.json");

    let mut memory = TranslationMemory::new();
    memory.put(&MemoryKey::for_text(Some("en"), "fr", "Log in"), "Se connecter");
    memory.flush(&path)?;

    let mut reloaded = TranslationMemory::load(&path);

    assert_eq!(reloaded.len(), 1);
    assert_eq!(
        reloaded.lookup(&MemoryKey::for_text(Some("EN"), "FR", "log  in")),
        Some("Se connecter")
    );
    assert_eq!(reloaded.stats().hits, 1);

    Ok(())
}

/// Test the on-disk key layout
#[test]
fn test_flush_shouldWriteFlatStringMapping() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("tm.json");

    let mut memory = TranslationMemory::new();
    memory.put(&MemoryKey::for_text(None, "fr", "Material"), "Matériau");
    memory.flush(&path)?;

    let stored: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let key = format!("any-fr:hash:{}", fingerprint("Material"));

    assert_eq!(stored[key.as_str()], "Matériau");

    Ok(())
}

/// Test that a corrupted store is reset to an empty object
#[test]
fn test_load_withCorruptStore_shouldResetIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "tm.json", "{\"en-fr:hash:abc\": ")?;

    let memory = TranslationMemory::load(&path);

    assert!(memory.is_empty());
    assert_eq!(fs::read_to_string(&path)?.trim(), "{}");

    Ok(())
}

/// Test that a store holding something other than a string map is also reset
#[test]
fn test_load_withWrongShape_shouldStartEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "tm.json", "[\"not\", \"a\", \"map\"]")?;

    assert!(TranslationMemory::load(&path).is_empty());

    Ok(())
}

/// Test that flushing is skipped outside update mode or with nothing to write
#[test]
fn test_flushIfEnabled_shouldOnlyWriteInUpdateMode() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("tm.json");

    let mut memory = TranslationMemory::new();
    assert!(!memory.flush_if_enabled(&path, true)?);

    memory.put(&MemoryKey::for_text(Some("en"), "fr", "Height"), "Hauteur");
    assert!(!memory.flush_if_enabled(&path, false)?);
    assert!(!path.exists());

    assert!(memory.flush_if_enabled(&path, true)?);
    assert!(path.exists());

    Ok(())
}
