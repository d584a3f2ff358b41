use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::file_utils::FileManager;
use crate::language_utils::validate_language_code;
use crate::translation::batch::LadderConfig;

/// Application configuration module
/// This module handles loading, defaulting and validating the settings of a
/// localization run.
/// Represents the run configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Source and target languages
    pub languages: LanguageConfig,

    /// Translation memory store
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Batch sizes and retry policy
    #[serde(default)]
    pub batching: BatchingConfig,

    /// Bulk translation service
    #[serde(default)]
    pub translation: TranslationConfig,

    /// LLM review pass
    #[serde(default)]
    pub review: ReviewConfig,

    /// Cross-corpus harmonization
    #[serde(default)]
    pub harmonization: HarmonizationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Languages of a run
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LanguageConfig {
    // @field: Primary source language, also used in memory keys
    #[serde(default)]
    pub primary: Option<String>,

    // @field: Second accepted source language
    #[serde(default)]
    pub secondary: Option<String>,

    // @field: Target language
    pub target: String,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            primary: Some("en".to_string()),
            secondary: None,
            target: "fr".to_string(),
        }
    }
}

impl LanguageConfig {
    // @returns: Source languages that get translated
    pub fn allowed_sources(&self) -> Vec<String> {
        self.primary
            .iter()
            .chain(self.secondary.iter())
            .filter(|lang| !lang.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// Translation memory settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MemoryConfig {
    // @field: Store location
    #[serde(default = "default_memory_path")]
    pub path: PathBuf,

    // @field: Write fresh translations back at the end of the run
    #[serde(default)]
    pub update: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: default_memory_path(),
            update: false,
        }
    }
}

/// Batching and retry settings shared by every upstream step
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BatchingConfig {
    // @field: Units per bulk translation call
    #[serde(default = "default_bulk_batch_size")]
    pub bulk_batch_size: usize,

    // @field: Entries per review call
    #[serde(default = "default_llm_batch_size")]
    pub review_batch_size: usize,

    // @field: Groups per harmonization call
    #[serde(default = "default_llm_batch_size")]
    pub harmonization_batch_size: usize,

    // @field: Attempts per batch before going item by item
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    // @field: Base backoff between attempts
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    // @field: Random jitter added to each backoff
    #[serde(default)]
    pub retry_jitter_ms: u64,

    // @field: Pause between bulk batches
    #[serde(default)]
    pub inter_batch_delay_ms: u64,

    // @field: Pause between review and harmonization batches
    #[serde(default = "default_review_delay_ms")]
    pub review_delay_ms: u64,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            bulk_batch_size: default_bulk_batch_size(),
            review_batch_size: default_llm_batch_size(),
            harmonization_batch_size: default_llm_batch_size(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            retry_jitter_ms: 0,
            inter_batch_delay_ms: 0,
            review_delay_ms: default_review_delay_ms(),
        }
    }
}

impl BatchingConfig {
    fn ladder(&self, batch_size: usize, inter_batch_delay_ms: u64) -> LadderConfig {
        LadderConfig {
            batch_size,
            max_retries: self.max_retries,
            retry_backoff_ms: self.retry_backoff_ms,
            retry_jitter_ms: self.retry_jitter_ms,
            inter_batch_delay_ms,
        }
    }

    // @returns: Ladder settings for the bulk translation pass
    pub fn bulk_ladder(&self) -> LadderConfig {
        self.ladder(self.bulk_batch_size, self.inter_batch_delay_ms)
    }

    // @returns: Ladder settings for the review pass
    pub fn review_ladder(&self) -> LadderConfig {
        self.ladder(self.review_batch_size, self.review_delay_ms)
    }

    // @returns: Ladder settings for the harmonization pass
    pub fn harmonization_ladder(&self) -> LadderConfig {
        self.ladder(self.harmonization_batch_size, self.review_delay_ms)
    }
}

/// Bulk translation service settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    // @field: Service URL
    #[serde(default = "default_deepl_endpoint")]
    pub endpoint: String,

    // @field: API key; falls back to DEEPL_AUTH_KEY
    #[serde(default)]
    pub api_key: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_deepl_endpoint(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TranslationConfig {
    /// Get the API key, reading the environment when none is configured
    pub fn get_api_key(&self) -> String {
        key_or_env(&self.api_key, "DEEPL_AUTH_KEY")
    }
}

/// Chat provider type used for review and harmonization
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewProvider {
    // @provider: OpenAI (or any compatible server)
    #[default]
    OpenAI,
    // @provider: Anthropic
    Anthropic,
}

impl ReviewProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Environment variable holding the API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for ReviewProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name().to_lowercase())
    }
}

impl std::str::FromStr for ReviewProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Review pass settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReviewConfig {
    // @field: Run the review pass
    #[serde(default)]
    pub enabled: bool,

    // @field: Chat provider
    #[serde(default)]
    pub provider: ReviewProvider,

    // @field: Model name
    #[serde(default = "default_review_model")]
    pub model: String,

    // @field: API key; falls back to the provider's environment variable
    #[serde(default)]
    pub api_key: String,

    // @field: Service URL; empty means the provider's public API
    #[serde(default)]
    pub endpoint: String,

    // @field: Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    // @field: Maximum reply tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    // @field: Timeout seconds
    #[serde(default = "default_review_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: ReviewProvider::default(),
            model: default_review_model(),
            api_key: String::new(),
            endpoint: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_review_timeout_secs(),
        }
    }
}

impl ReviewConfig {
    /// Get the API key, reading the environment when none is configured
    pub fn get_api_key(&self) -> String {
        key_or_env(&self.api_key, self.provider.api_key_env())
    }
}

/// Harmonization settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HarmonizationConfig {
    // @field: Run harmonization across the corpus
    #[serde(default = "default_true")]
    pub enabled: bool,

    // @field: Characters of normalized text shown in group labels
    #[serde(default = "default_label_length")]
    pub label_length: usize,

    // @field: Let the chat provider pick the agreed translation even when the review pass is off
    #[serde(default)]
    pub use_reviewer: bool,
}

impl Default for HarmonizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            label_length: default_label_length(),
            use_reviewer: false,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn key_or_env(configured: &str, env_var: &str) -> String {
    if configured.is_empty() {
        std::env::var(env_var).unwrap_or_default()
    } else {
        configured.to_string()
    }
}

fn default_memory_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("batchloc")
        .join("translation_memory.json")
}

fn default_bulk_batch_size() -> usize {
    330
}

fn default_llm_batch_size() -> usize {
    10
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_review_delay_ms() -> u64 {
    1000
}

fn default_deepl_endpoint() -> String {
    "https://api.deepl.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_review_timeout_secs() -> u64 {
    120
}

fn default_review_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_true() -> bool {
    true
}

fn default_label_length() -> usize {
    50
}

impl Config {
    /// Load a configuration file (JSON)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        FileManager::read_json(path).with_context(|| format!("Failed to load configuration from {:?}", path))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.validate_settings()?;

        if self.translation.get_api_key().is_empty() {
            return Err(anyhow!("Translation API key is required (set it in the config or DEEPL_AUTH_KEY)"));
        }

        if self.needs_reviewer() && self.review.get_api_key().is_empty() {
            return Err(anyhow!(
                "Review API key is required for {} provider (set it in the config or {})",
                self.review.provider.display_name(),
                self.review.provider.api_key_env()
            ));
        }

        Ok(())
    }

    // @returns: Whether a chat provider is needed by the review or harmonization pass
    pub fn needs_reviewer(&self) -> bool {
        self.review.enabled || (self.harmonization.enabled && self.harmonization.use_reviewer)
    }

    /// Validate everything except credentials
    pub fn validate_settings(&self) -> Result<()> {
        // Validate languages
        validate_language_code(&self.languages.target)
            .with_context(|| format!("Invalid target language: {}", self.languages.target))?;
        if self.languages.allowed_sources().is_empty() {
            return Err(anyhow!("At least one source language (primary or secondary) is required"));
        }
        for lang in self.languages.allowed_sources() {
            validate_language_code(&lang).with_context(|| format!("Invalid source language: {}", lang))?;
        }

        // Validate batching
        let batching = &self.batching;
        if batching.bulk_batch_size == 0 || batching.review_batch_size == 0 || batching.harmonization_batch_size == 0 {
            return Err(anyhow!("Batch sizes must be greater than zero"));
        }
        if batching.max_retries == 0 {
            return Err(anyhow!("max_retries must be at least 1"));
        }

        // Validate translation service
        Url::parse(&self.translation.endpoint)
            .with_context(|| format!("Invalid translation endpoint: {}", self.translation.endpoint))?;

        // Validate review provider
        if self.needs_reviewer() && !self.review.endpoint.is_empty() {
            Url::parse(&self.review.endpoint)
                .with_context(|| format!("Invalid review endpoint: {}", self.review.endpoint))?;
        }

        Ok(())
    }
}
