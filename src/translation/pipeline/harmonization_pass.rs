/*!
 * Harmonization pass: one translation per distinct source text.
 *
 * Units are grouped across the whole corpus by the fingerprint of their
 * normalized source text. Groups whose members already agree are left alone;
 * the others are sent to a chat model that picks the most natural translation,
 * which is then applied to every member. When the model gives nothing usable
 * the group converges on its most frequent current translation.
 */

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use crate::providers::ChatBackend;
use crate::translation::batch::{BatchOutcome, BatchStep, FallbackLadder, LadderConfig, LadderStats};
use crate::translation::document::{RenderedText, TranslationMap, TranslationUnit};
use crate::translation::fingerprint::{ContentFingerprint, normalize};
use crate::translation::prompts::{
    HarmonizationEntry, PromptLanguages, PromptTemplate, harmonization_transcript, restore_line_breaks,
};
use crate::translation::response::parse_id_map;

/// Default number of groups per harmonization call
pub const DEFAULT_HARMONIZATION_BATCH_SIZE: usize = 10;

/// Default length of the group display label
pub const DEFAULT_LABEL_LENGTH: usize = 50;

/// Units sharing one normalized source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarmonizationGroup {
    /// Fingerprint of the full normalized source text
    pub key: ContentFingerprint,

    /// Truncated normalized text, for logs only
    pub label: String,

    /// Source text of the first member
    pub source: String,

    /// Member tokens in first-seen order
    pub members: Vec<String>,

    /// Current translation of each member, aligned with `members`
    pub translations: Vec<String>,
}

impl HarmonizationGroup {
    /// Whether all members already carry the same translation
    pub fn is_consistent(&self) -> bool {
        self.translations.iter().collect::<HashSet<_>>().len() <= 1
    }

    /// Most frequent current translation; ties go to the earliest member
    pub fn local_majority(&self) -> String {
        most_frequent(self.translations.iter().map(String::as_str)).unwrap_or(self.source.as_str()).to_string()
    }
}

fn most_frequent<'a>(values: impl Iterator<Item = &'a str> + Clone) -> Option<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.clone() {
        *counts.entry(value).or_insert(0) += 1;
    }
    let max = counts.values().copied().max()?;
    values.into_iter().find(|value| counts.get(value) == Some(&max))
}

/// Group `units` by normalized source text, in first-seen order.
///
/// Every unit lands in exactly one group; singletons included. A unit
/// missing from `map` is listed with its source text.
pub fn group_units(units: &[TranslationUnit], map: &TranslationMap, label_length: usize) -> Vec<HarmonizationGroup> {
    let mut groups: Vec<HarmonizationGroup> = Vec::new();
    let mut index: HashMap<ContentFingerprint, usize> = HashMap::new();
    let mut seen = HashSet::new();

    for unit in units {
        if !seen.insert(unit.token.as_str()) {
            continue;
        }

        let normalized = normalize(&unit.source_text);
        let key = ContentFingerprint::of(&normalized);
        let translation = map.get(&unit.token).cloned().unwrap_or_else(|| unit.source_text.clone());

        match index.get(&key) {
            Some(&i) => {
                groups[i].members.push(unit.token.clone());
                groups[i].translations.push(translation);
            }
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(HarmonizationGroup {
                    key,
                    label: normalized.chars().take(label_length).collect(),
                    source: unit.source_text.clone(),
                    members: vec![unit.token.clone()],
                    translations: vec![translation],
                });
            }
        }
    }

    groups
}

/// Output of [`HarmonizationEngine::harmonize`]
#[derive(Debug, Clone, Default)]
pub struct HarmonizationReport {
    /// Groups with at least two members
    pub groups_total: usize,

    /// Multi-member groups that already agreed and were skipped
    pub groups_consistent: usize,

    /// Groups where at least one member changed
    pub groups_updated: usize,

    /// Units whose translation changed
    pub units_updated: usize,

    /// Calls made to the reviewer
    pub review_calls: usize,

    pub ladder: LadderStats,
}

impl HarmonizationReport {
    /// Whether the translation map was modified
    pub fn changed(&self) -> bool {
        self.units_updated > 0
    }
}

/// Cross-corpus harmonization of duplicate source text
#[derive(Debug, Clone)]
pub struct HarmonizationEngine {
    reviewer: Option<Arc<dyn ChatBackend>>,
    system_prompt: String,
    ladder: FallbackLadder,
    label_length: usize,
}

impl HarmonizationEngine {
    /// Engine that asks `reviewer` to pick the agreed translation
    pub fn new(reviewer: Arc<dyn ChatBackend>, languages: &PromptLanguages) -> Self {
        Self {
            reviewer: Some(reviewer),
            system_prompt: PromptTemplate::harmonization().render(languages),
            ladder: FallbackLadder::new(LadderConfig::default().with_batch_size(DEFAULT_HARMONIZATION_BATCH_SIZE)),
            label_length: DEFAULT_LABEL_LENGTH,
        }
    }

    /// Engine that always converges on the local majority
    pub fn local() -> Self {
        Self {
            reviewer: None,
            system_prompt: String::new(),
            ladder: FallbackLadder::default(),
            label_length: DEFAULT_LABEL_LENGTH,
        }
    }

    pub fn with_ladder(mut self, config: LadderConfig) -> Self {
        self.ladder = FallbackLadder::new(config);
        self
    }

    pub fn with_label_length(mut self, label_length: usize) -> Self {
        self.label_length = label_length;
        self
    }

    /// Make every group of `units` agree on one translation inside `map`
    pub async fn harmonize(&self, units: &[TranslationUnit], map: &mut TranslationMap) -> HarmonizationReport {
        let mut report = HarmonizationReport::default();

        let groups: Vec<HarmonizationGroup> = group_units(units, map, self.label_length)
            .into_iter()
            .filter(|group| group.members.len() > 1)
            .collect();
        report.groups_total = groups.len();

        let (consistent, pending): (Vec<_>, Vec<_>) = groups.into_iter().partition(HarmonizationGroup::is_consistent);
        report.groups_consistent = consistent.len();

        if pending.is_empty() {
            debug!("All {} duplicate groups already consistent", report.groups_total);
            return report;
        }

        info!("Harmonizing {} of {} duplicate groups", pending.len(), report.groups_total);

        let mut agreed: HashMap<String, RenderedText> = match self.reviewer {
            Some(_) => {
                let run = self.ladder.run(self, &pending).await;
                report.ladder = run.stats;
                report.review_calls = run.stats.batch_attempts + run.stats.single_attempts;
                run.results
            }
            None => HashMap::new(),
        };

        for group in &pending {
            let value = agreed
                .remove(group.key.as_str())
                .map(|rendered| rendered.text)
                .unwrap_or_else(|| group.local_majority());

            let mut changed = 0;
            for (member, current) in group.members.iter().zip(&group.translations) {
                if current != &value {
                    changed += 1;
                }
                map.insert(member.clone(), value.clone());
            }

            if changed > 0 {
                debug!("Group '{}' -> '{}' ({} units updated)", group.label, value, changed);
                report.groups_updated += 1;
                report.units_updated += changed;
            }
        }

        info!(
            "Harmonization updated {} units in {} groups",
            report.units_updated, report.groups_updated
        );
        report
    }
}

#[async_trait]
impl BatchStep for HarmonizationEngine {
    type Item = HarmonizationGroup;

    fn item_id<'a>(&self, item: &'a HarmonizationGroup) -> &'a str {
        item.key.as_str()
    }

    fn fallback_value(&self, item: &HarmonizationGroup) -> String {
        item.local_majority()
    }

    async fn attempt_batch(&self, items: &[HarmonizationGroup]) -> BatchOutcome {
        let Some(reviewer) = &self.reviewer else {
            return BatchOutcome::Success(HashMap::new());
        };

        let entries: Vec<HarmonizationEntry<'_>> = items
            .iter()
            .map(|group| HarmonizationEntry {
                source: &group.source,
                translations: group
                    .members
                    .iter()
                    .map(String::as_str)
                    .zip(group.translations.iter().map(String::as_str))
                    .collect(),
            })
            .collect();
        let transcript = harmonization_transcript(&entries);

        let response = match reviewer.complete(&self.system_prompt, &transcript).await {
            Ok(response) => response,
            Err(e) => return BatchOutcome::Failure(e.into()),
        };

        let patch = match parse_id_map(&response) {
            Ok(patch) => patch,
            Err(e) => return BatchOutcome::Failure(e),
        };

        BatchOutcome::Success(
            items
                .iter()
                .filter_map(|group| {
                    let answered: Vec<&str> = group
                        .members
                        .iter()
                        .filter_map(|member| patch.get(member).map(String::as_str))
                        .collect();
                    most_frequent(answered.iter().copied())
                        .map(|value| (group.key.to_string(), RenderedText::translated(restore_line_breaks(value))))
                })
                .collect(),
        )
    }
}
