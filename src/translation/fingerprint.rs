/*!
 * Content fingerprints for translation memory lookups.
 *
 * A fingerprint is a short digest of the normalized source text, so that
 * formatting-only differences (case, runs of whitespace) share one memory entry.
 */

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the SHA-256 digest (64 bits)
pub const FINGERPRINT_HEX_LEN: usize = 16;

/// Short fixed-width digest of normalized text
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    /// Compute the fingerprint of `text`
    pub fn of(text: &str) -> Self {
        let normalized = normalize(text);
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Self(digest[..FINGERPRINT_HEX_LEN].to_string())
    }

    /// The hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shorthand for [`ContentFingerprint::of`]
pub fn fingerprint(text: &str) -> ContentFingerprint {
    ContentFingerprint::of(text)
}

/// Collapse whitespace runs to one space, trim, and lowercase
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
