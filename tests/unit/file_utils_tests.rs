/*!
 * Tests for file utility functions
 */

use std::collections::BTreeMap;
use std::fs;

use anyhow::Result;
use batchloc::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));

    Ok(())
}

/// Test that file_exists returns false for non-existent files and directories
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    assert!(!FileManager::file_exists(temp_dir.path().join("non_existent_file.tmp")));
    assert!(!FileManager::file_exists(temp_dir.path()));

    Ok(())
}

/// Test that ensure_dir creates nested directories
#[test]
fn test_ensure_dir_withNonExistentDir_shouldCreateDirectory() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_subdir = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&test_subdir)?;

    assert!(test_subdir.is_dir());

    Ok(())
}

/// Test that find_files only returns matching extensions, sorted
#[test]
fn test_find_files_withMixedExtensions_shouldReturnSortedMatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "b.json", "{}")?;
    common::create_test_file(temp_dir.path(), "nested/a.JSON", "{}")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "")?;

    let files = FileManager::find_files(temp_dir.path(), ".json")?;

    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("b.json"));
    assert!(files[1].ends_with("nested/a.JSON"));

    Ok(())
}

/// Test that an atomic JSON write can be read back
#[test]
fn test_write_json_atomic_thenReadJson_shouldPreserveContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out").join("translations.json");
    let mut map = BTreeMap::new();
    map.insert("A".to_string(), "Se connecter".to_string());

    FileManager::write_json_atomic(&path, &map)?;
    let read: BTreeMap<String, String> = FileManager::read_json(&path)?;

    assert_eq!(read, map);
    // no temporary files left next to the target
    assert_eq!(fs::read_dir(path.parent().unwrap_or(temp_dir.path()))?.count(), 1);

    Ok(())
}

/// Test that read_to_string reports missing files
#[test]
fn test_read_to_string_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    assert!(FileManager::read_to_string(temp_dir.path().join("missing.json")).is_err());

    Ok(())
}
