/*!
 * Loading extractor output.
 *
 * The extractor hands over an ordered JSON object per document. Two shapes
 * are accepted:
 *
 * - unit files: `token -> "text"` or `token -> {source_text, grouping_tag?, parent_block_id?}`
 * - block files: `block_id -> {text?, segments?: {segment_id: text}}`, where a
 *   segment becomes the unit `<block_id>_<segment_id>`
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::info;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::file_utils::FileManager;

use super::model::TranslationUnit;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UnitEntry {
    Text(String),
    Record {
        source_text: String,
        #[serde(default)]
        grouping_tag: Option<String>,
        #[serde(default)]
        parent_block_id: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct BlockEntry {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    segments: Option<Map<String, Value>>,
}

/// Parse a unit file body, keeping the extractor's order
pub fn parse_units(json: &str) -> Result<Vec<TranslationUnit>> {
    let object: Map<String, Value> = serde_json::from_str(json).context("Units must be a JSON object")?;

    object
        .into_iter()
        .map(|(token, value)| {
            let entry: UnitEntry = serde_json::from_value(value)
                .with_context(|| format!("Invalid unit '{}'", token))?;
            Ok(match entry {
                UnitEntry::Text(source_text) => TranslationUnit::new(token, source_text),
                UnitEntry::Record { source_text, grouping_tag, parent_block_id } => TranslationUnit {
                    token,
                    source_text,
                    grouping_tag,
                    parent_block_id,
                },
            })
        })
        .collect()
}

/// Flatten a block file body into units
pub fn parse_blocks(json: &str) -> Result<Vec<TranslationUnit>> {
    let object: Map<String, Value> = serde_json::from_str(json).context("Blocks must be a JSON object")?;
    let mut units = Vec::new();

    for (block_id, value) in object {
        let block: BlockEntry = serde_json::from_value(value)
            .with_context(|| format!("Invalid block '{}'", block_id))?;

        if let Some(text) = block.text {
            units.push(TranslationUnit::new(block_id.clone(), text));
        }

        for (segment_id, segment) in block.segments.unwrap_or_default() {
            let text = segment
                .as_str()
                .ok_or_else(|| anyhow!("Segment '{}' of block '{}' is not a string", segment_id, block_id))?;
            units.push(
                TranslationUnit::new(format!("{}_{}", block_id, segment_id), text)
                    .with_parent(block_id.clone()),
            );
        }
    }

    Ok(units)
}

/// One extracted document
#[derive(Debug, Clone)]
pub struct Document {
    /// Display name (usually the source path)
    pub name: String,

    /// Units in extraction order
    pub units: Vec<TranslationUnit>,
}

impl Document {
    pub fn new(name: impl Into<String>, units: Vec<TranslationUnit>) -> Self {
        Self { name: name.into(), units }
    }

    /// Load a unit file
    pub fn load_units<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;
        let units = parse_units(&content).with_context(|| format!("Failed to load units from {:?}", path))?;
        Ok(Self::new(path.display().to_string(), units))
    }

    /// Load a block file
    pub fn load_blocks<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;
        let units = parse_blocks(&content).with_context(|| format!("Failed to load blocks from {:?}", path))?;
        Ok(Self::new(path.display().to_string(), units))
    }
}

/// Every document taking part in one run.
///
/// Tokens must be unique across the corpus; the same token may only repeat
/// with the same source text.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    sources: HashMap<String, String>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a single-document corpus
    pub fn from_units(name: impl Into<String>, units: Vec<TranslationUnit>) -> Result<Self> {
        let mut corpus = Self::new();
        corpus.push(Document::new(name, units))?;
        Ok(corpus)
    }

    /// Load every `*.json` unit file under `dir`
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let files: Vec<PathBuf> = FileManager::find_files(dir, "json")?;
        let mut corpus = Self::new();

        for file in files {
            corpus.push(Document::load_units(&file)?)?;
        }

        info!("Loaded {} documents ({} units) from {:?}", corpus.documents.len(), corpus.unit_count(), dir);
        Ok(corpus)
    }

    /// Add a document, rejecting tokens that clash with a different source text.
    ///
    /// A rejected document registers none of its tokens.
    pub fn push(&mut self, document: Document) -> Result<()> {
        let mut pending: HashMap<&str, &str> = HashMap::new();
        for unit in &document.units {
            let existing = self
                .sources
                .get(&unit.token)
                .map(String::as_str)
                .or_else(|| pending.get(unit.token.as_str()).copied());
            match existing {
                Some(existing) if existing != unit.source_text => {
                    return Err(anyhow!(
                        "Token '{}' in {} conflicts with an earlier unit of a different text",
                        unit.token,
                        document.name
                    ));
                }
                Some(_) => {}
                None => {
                    pending.insert(&unit.token, &unit.source_text);
                }
            }
        }

        for (token, source_text) in pending {
            self.sources.insert(token.to_string(), source_text.to_string());
        }
        self.documents.push(document);
        Ok(())
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// All units, deduplicated by token, in document order
    pub fn units(&self) -> Vec<TranslationUnit> {
        let mut seen = std::collections::HashSet::new();
        self.documents
            .iter()
            .flat_map(|doc| doc.units.iter())
            .filter(|unit| seen.insert(unit.token.clone()))
            .cloned()
            .collect()
    }

    /// Number of distinct tokens
    pub fn unit_count(&self) -> usize {
        self.sources.len()
    }
}
