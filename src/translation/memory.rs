/*!
 * Persistent translation memory.
 *
 * The memory maps a language pair plus a content fingerprint to the text
 * produced for it, so previously translated content is never sent upstream
 * again. It is loaded once per run, mutated in place, and flushed atomically
 * at the end when update mode is enabled.
 */

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info, warn};

use crate::errors::MemoryError;
use crate::file_utils::FileManager;

use super::fingerprint::ContentFingerprint;

/// Placeholder used when no primary source language is configured
pub const ANY_LANGUAGE: &str = "any";

/// Composite key addressing one cached translation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryKey {
    /// Primary source language, or `any`
    pub source_language: String,

    /// Target language
    pub target_language: String,

    /// Fingerprint of the normalized source text
    pub fingerprint: ContentFingerprint,
}

impl MemoryKey {
    /// Create a key; language codes are lowercased so "FR" and "fr" share entries
    pub fn new(source_language: Option<&str>, target_language: &str, fingerprint: ContentFingerprint) -> Self {
        let source_language = source_language
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .unwrap_or(ANY_LANGUAGE)
            .to_lowercase();

        Self {
            source_language,
            target_language: target_language.trim().to_lowercase(),
            fingerprint,
        }
    }

    /// Key for a piece of source text
    pub fn for_text(source_language: Option<&str>, target_language: &str, text: &str) -> Self {
        Self::new(source_language, target_language, ContentFingerprint::of(text))
    }
}

impl fmt::Display for MemoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}:hash:{}", self.source_language, self.target_language, self.fingerprint)
    }
}

/// Memory usage statistics for a run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryStats {
    /// Number of stored entries
    pub entries: usize,

    /// Lookups that found an entry
    pub hits: usize,

    /// Lookups that found nothing
    pub misses: usize,
}

impl MemoryStats {
    /// Share of lookups served from memory (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Translation memory owned by a single run
#[derive(Debug, Clone, Default)]
pub struct TranslationMemory {
    entries: BTreeMap<String, String>,
    hits: usize,
    misses: usize,
}

impl TranslationMemory {
    /// Create an empty memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the memory stored at `path`
    ///
    /// Never fails: a missing or unreadable store yields an empty memory, and a
    /// malformed one is additionally reset on disk to `{}`.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No translation memory at {:?}, starting empty", path);
                return Self::new();
            }
            Err(e) => {
                warn!("Could not read translation memory {:?} ({}), starting empty", path, e);
                return Self::new();
            }
        };

        match serde_json::from_str::<BTreeMap<String, String>>(&content) {
            Ok(entries) => {
                info!("Loaded {} cached translations from {:?}", entries.len(), path);
                Self { entries, hits: 0, misses: 0 }
            }
            Err(e) => {
                warn!("Corrupted translation memory {:?} ({}), resetting it", path, e);
                if let Err(e) = FileManager::write_atomic(path, "{}") {
                    warn!("Could not reset corrupted translation memory {:?}: {}", path, e);
                }
                Self::new()
            }
        }
    }

    /// Look up a key, counting the hit or miss
    pub fn lookup(&mut self, key: &MemoryKey) -> Option<&str> {
        match self.entries.get(&key.to_string()) {
            Some(text) => {
                self.hits += 1;
                debug!("Memory hit for {}", key);
                Some(text.as_str())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Look up a key without touching the statistics
    pub fn get(&self, key: &MemoryKey) -> Option<&str> {
        self.entries.get(&key.to_string()).map(String::as_str)
    }

    /// Check whether a key is stored
    pub fn contains(&self, key: &MemoryKey) -> bool {
        self.entries.contains_key(&key.to_string())
    }

    /// Store a translation; the last write wins
    pub fn put(&mut self, key: &MemoryKey, text: impl Into<String>) {
        self.entries.insert(key.to_string(), text.into());
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the memory is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get memory statistics
    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Write the full mapping to `path`, creating parent directories
    pub fn flush<P: AsRef<Path>>(&self, path: P) -> Result<(), MemoryError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.entries)?;

        FileManager::write_atomic(path, &json).map_err(|source| MemoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Updated translation memory with {} entries", self.entries.len());
        Ok(())
    }

    /// Flush only when update mode is on and there is something to write
    ///
    /// Returns whether the store was written. An empty memory never replaces
    /// an existing store.
    pub fn flush_if_enabled<P: AsRef<Path>>(&self, path: P, update_mode: bool) -> Result<bool, MemoryError> {
        if !update_mode || self.entries.is_empty() {
            return Ok(false);
        }
        self.flush(path)?;
        Ok(true)
    }
}
