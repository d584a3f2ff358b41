use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

use super::{Detection, TranslationBackend};

/// Default endpoint of the paid API
pub const DEFAULT_ENDPOINT: &str = "https://api.deepl.com";

/// DeepL client for bulk translation
#[derive(Debug)]
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, without the `/v2` path
    endpoint: String,
}

/// Translate request body
#[derive(Debug, Serialize)]
pub struct DeepLRequest<'a> {
    /// Texts to translate
    text: &'a [String],

    /// Target language, upper case
    target_lang: String,

    /// Keep punctuation and casing as written
    preserve_formatting: bool,
}

/// One entry of a translate response
#[derive(Debug, Deserialize)]
pub struct DeepLTranslation {
    /// Language detected for the input text
    pub detected_source_language: String,

    /// The translated text
    pub text: String,
}

/// Translate response body
#[derive(Debug, Deserialize)]
pub struct DeepLResponse {
    pub translations: Vec<DeepLTranslation>,
}

impl DeepL {
    /// Create a new DeepL client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self) -> String {
        let base = if self.endpoint.is_empty() { DEFAULT_ENDPOINT } else { self.endpoint.as_str() };
        format!("{}/v2/translate", base.trim_end_matches('/'))
    }
}

#[async_trait]
impl TranslationBackend for DeepL {
    async fn translate(&self, texts: &[String], target_lang: &str) -> Result<Vec<Detection>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = DeepLRequest {
            text: texts,
            target_lang: target_lang.to_uppercase(),
            preserve_formatting: true,
        };

        debug!("Sending {} texts to DeepL ({})", texts.len(), request.target_lang);

        let response = self
            .client
            .post(self.api_url())
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("DeepL API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let deepl_response = response
            .json::<DeepLResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse DeepL API response: {}", e)))?;

        Ok(deepl_response
            .translations
            .into_iter()
            .map(|t| Detection::new(t.detected_source_language, t.text))
            .collect())
    }
}
