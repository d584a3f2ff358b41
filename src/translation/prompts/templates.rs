/*!
 * Prompt templates for the review and harmonization passes.
 *
 * Both passes send a plain-text transcript as the user message and expect a
 * single `{block_id: text}` JSON object back.
 */

/// Languages a prompt is rendered for
#[derive(Debug, Clone)]
pub struct PromptLanguages {
    /// Primary source language
    pub primary: String,
    /// Optional second accepted source language
    pub secondary: Option<String>,
    /// Target language
    pub target: String,
}

impl PromptLanguages {
    pub fn new(primary: impl Into<String>, secondary: Option<String>, target: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary,
            target: target.into(),
        }
    }

    fn source_description(&self) -> String {
        match &self.secondary {
            Some(secondary) => format!("{} or {}", self.primary, secondary),
            None => self.primary.clone(),
        }
    }
}

/// System prompt template for reviewing existing translations
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Review instructions
    pub const REVIEW: &'static str = r#"You are a professional translator reviewing {target_language} translations of website content.

## Input
Each entry has three lines:
   BLOCK_ID | tag_name
   {primary_language}: original text in {source_languages}
   {target_language}: current translation

## Rules
- Keep the current translation unless it has a real defect:
  - Accuracy: wrong meaning, missing information
  - Grammar: verb forms, word order, agreement
  - Naturalness: awkward or overly literal phrasing
  - Terminology: inconsistent or inappropriate word choices
  - Context: does not fit a web interface
- Everyday descriptive words ("Height", "Width", "Material", "Color", "Size") are always translated.
- Only original text written in {source_languages} is translated. For any other language, return the original text unchanged.
- Return every block you received. Never omit a block.

## Example
```
BLOCK_123 | a
en: Log in to your account
fr: Connecter à votre compte
```
The grammar is wrong, so return `Se connecter à votre compte`.

## Output
Return ONLY a JSON object mapping every BLOCK_ID to its improved or current translation:
{"BLOCK_X": "...", "BLOCK_Y": "..."}"#;

    /// Harmonization instructions
    pub const HARMONIZATION: &'static str = r#"You will receive groups of block IDs that share the same original {primary_language} text, with the current {target_language} translation of each block.

For each group:
- If the translations differ, choose the most appropriate and natural one and apply it to every block ID of the group.
- If they are already consistent, keep them unchanged.
- Date abbreviations (BCE, CE, AD, c., century) stay abbreviated and are translated consistently. For French: BCE → av. notre ère, CE → de notre ère, c. → v., century → s. (e.g. 5e s.).

Return ONLY a single JSON object mapping block IDs to translations:
{"BLOCK_24": "...", "BLOCK_134": "..."}"#;

    pub fn new(template: &str) -> Self {
        Self { template: template.to_string() }
    }

    pub fn review() -> Self {
        Self::new(Self::REVIEW)
    }

    pub fn harmonization() -> Self {
        Self::new(Self::HARMONIZATION)
    }

    /// Render the template for the given languages
    pub fn render(&self, languages: &PromptLanguages) -> String {
        self.template
            .replace("{primary_language}", &languages.primary)
            .replace("{source_languages}", &languages.source_description())
            .replace("{target_language}", &languages.target)
    }
}

/// One entry of a review transcript
#[derive(Debug, Clone, Copy)]
pub struct ReviewEntry<'a> {
    pub id: &'a str,
    pub tag: Option<&'a str>,
    pub source: &'a str,
    pub current: &'a str,
}

/// Build the review transcript, entries separated by a blank line
pub fn review_transcript(entries: &[ReviewEntry<'_>], languages: &PromptLanguages) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{} | {}\n{}: {}\n{}: {}",
                entry.id,
                entry.tag.unwrap_or("text"),
                languages.primary,
                escape_line_breaks(entry.source),
                languages.target,
                escape_line_breaks(entry.current)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One group of a harmonization transcript
#[derive(Debug, Clone)]
pub struct HarmonizationEntry<'a> {
    /// Shared source text
    pub source: &'a str,
    /// Member id and its current translation, in member order
    pub translations: Vec<(&'a str, &'a str)>,
}

/// Build the harmonization transcript
///
/// ```text
/// A=B = source {
/// A = "text"
/// B = "text"
/// }
/// ```
pub fn harmonization_transcript(groups: &[HarmonizationEntry<'_>]) -> String {
    groups
        .iter()
        .map(|group| {
            let ids: Vec<&str> = group.translations.iter().map(|(id, _)| *id).collect();
            let mut block = format!("{} = {} {{\n", ids.join("="), escape_line_breaks(group.source));
            for (id, text) in &group.translations {
                block.push_str(&format!("{} = \"{}\"\n", id, escape_line_breaks(text)));
            }
            block.push_str("}\n");
            block
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render line breaks as literal `\r` and `\n` so every text stays on its transcript line
pub fn escape_line_breaks(text: &str) -> String {
    text.replace('\r', "\\r").replace('\n', "\\n")
}

/// Undo [`escape_line_breaks`] on a reply value
pub fn restore_line_breaks(text: &str) -> String {
    text.replace("\\r", "\r").replace("\\n", "\n")
}
