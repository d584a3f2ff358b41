/*!
 * Core data model shared by every pass.
 */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Final text per unit token, handed to the reinjection step
pub type TranslationMap = BTreeMap<String, String>;

/// One atomic piece of translatable text.
///
/// Units are created by the extractor and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// Opaque token, stable across runs for the same document position
    pub token: String,

    /// Source text
    pub source_text: String,

    /// Semantic category label (e.g. "h1", "button")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouping_tag: Option<String>,

    /// Block the unit belongs to, for segment units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_block_id: Option<String>,
}

impl TranslationUnit {
    /// Create a unit without tag or parent
    pub fn new(token: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            source_text: source_text.into(),
            grouping_tag: None,
            parent_block_id: None,
        }
    }

    /// Attach a grouping tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.grouping_tag = Some(tag.into());
        self
    }

    /// Attach a parent block id
    pub fn with_parent(mut self, parent_block_id: impl Into<String>) -> Self {
        self.parent_block_id = Some(parent_block_id.into());
        self
    }
}

/// Where a produced text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Served from translation memory
    Cached,
    /// Produced by the upstream service
    Translated,
    /// Passed through because the source language is not translated
    Unchanged,
    /// Filled with the prior known value after a failure or omission
    BackFilled,
}

/// Text produced for one item, tagged with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedText {
    pub text: String,
    pub origin: Origin,
}

impl RenderedText {
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        Self { text: text.into(), origin }
    }

    pub fn translated(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Translated)
    }

    pub fn unchanged(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Unchanged)
    }

    pub fn back_filled(text: impl Into<String>) -> Self {
        Self::new(text, Origin::BackFilled)
    }

    /// Whether this text should be written to translation memory
    pub fn is_fresh(&self) -> bool {
        self.origin == Origin::Translated
    }
}
