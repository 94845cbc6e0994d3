//! DeepL translation client with passthrough fallback
//!
//! Translation failure is never fatal to an import: any transport error,
//! unexpected response shape, or missing credential degrades to returning
//! the input unchanged.
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::Translator;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_debug, log_warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct DeepLTranslator {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

impl DeepLTranslator {
    pub fn new(api_url: String, api_key: Option<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    async fn request_translation(&self, text: &str, target_lang: &str) -> AppResult<String> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::InternalError("No DeepL credential".to_string()))?;

        let response = self
            .client
            .post(&self.api_url)
            .form(&[("auth_key", key), ("text", text), ("target_lang", target_lang)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "DeepL returned HTTP {}",
                response.status()
            )));
        }

        let body: DeepLResponse = response.json().await?;
        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| {
                AppError::ExternalServiceError("Empty DeepL translation list".to_string())
            })
    }
}

#[async_trait]
impl Translator for DeepLTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> String {
        if self.api_key.is_none() || text.trim().is_empty() {
            return text.to_string();
        }

        // One attempt per call; the import pipeline keeps going either way.
        match self.request_translation(text, target_lang).await {
            Ok(translated) => translated,
            Err(e) => {
                log_warn!("Translation failed, keeping original text: {}", e);
                log_debug!("Untranslated text head: {:.60}", text);
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passthrough_translator() -> DeepLTranslator {
        DeepLTranslator::new("https://api-free.deepl.com/v2/translate".to_string(), None).unwrap()
    }

    #[tokio::test]
    async fn test_no_credential_is_identity() {
        let translator = passthrough_translator();
        assert_eq!(translator.translate("Test Meal", "DE").await, "Test Meal");
    }

    #[tokio::test]
    async fn test_empty_text_is_identity() {
        let translator = passthrough_translator();
        assert_eq!(translator.translate("", "DE").await, "");
        assert_eq!(translator.translate("   ", "DE").await, "   ");
    }

    #[test]
    fn test_response_shape_parses() {
        let body = r#"{"translations":[{"detected_source_language":"EN","text":"Hallo Welt"}]}"#;
        let parsed: DeepLResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.translations[0].text, "Hallo Welt");
    }
}
