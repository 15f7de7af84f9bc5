use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::core::errors::TranslateError;
use crate::services::auth::TokenBroker;

const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com";

/// Machine translation of extracted text.
#[async_trait]
pub trait TextTranslator: Send + Sync {
    /// Translate `text` into the `target` language code. No empty-string
    /// special-casing and no local length limits; the service owns both.
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslateError>;
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslationList,
}

#[derive(Debug, Deserialize)]
struct TranslationList {
    #[serde(default)]
    translations: Vec<TranslationItem>,
}

#[derive(Debug, Deserialize)]
struct TranslationItem {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

fn translate_body(text: &str, target: &str) -> serde_json::Value {
    // format=text keeps the service from HTML-escaping the output.
    serde_json::json!({
        "q": text,
        "target": target,
        "format": "text"
    })
}

fn first_translation(response: TranslateResponse) -> Result<String, TranslateError> {
    response
        .data
        .translations
        .into_iter()
        .next()
        .map(|item| item.translated_text)
        .ok_or(TranslateError::MissingTranslation)
}

/// Translation v2 client.
pub struct TranslateClient {
    http: reqwest::Client,
    tokens: TokenBroker,
    endpoint: String,
}

impl TranslateClient {
    pub fn new(http: reqwest::Client, tokens: TokenBroker) -> Self {
        Self::with_endpoint(http, tokens, DEFAULT_ENDPOINT)
    }

    /// Same client against a different base URL. Test seam.
    pub fn with_endpoint(
        http: reqwest::Client,
        tokens: TokenBroker,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TextTranslator for TranslateClient {
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslateError> {
        debug!(target, chars = text.chars().count(), "requesting translation");

        let token = self.tokens.bearer().await?;
        let response = self
            .http
            .post(format!("{}/language/translate/v2", self.endpoint))
            .bearer_auth(token)
            .json(&translate_body(text, target))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Status { status, body });
        }

        let text = response.text().await?;
        let parsed: TranslateResponse = serde_json::from_str(&text)?;
        first_translation(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_body_carries_query_target_and_text_format() {
        let body = translate_body("Hello", "fr");
        assert_eq!(body["q"], "Hello");
        assert_eq!(body["target"], "fr");
        assert_eq!(body["format"], "text");
    }

    #[test]
    fn first_translation_is_extracted() {
        let parsed: TranslateResponse = serde_json::from_str(
            r#"{"data": {"translations": [
                {"translatedText": "Bonjour", "detectedSourceLanguage": "en"}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(first_translation(parsed).unwrap(), "Bonjour");
    }

    #[test]
    fn empty_translation_list_is_an_error() {
        let parsed: TranslateResponse =
            serde_json::from_str(r#"{"data": {"translations": []}}"#).unwrap();
        assert!(matches!(
            first_translation(parsed).unwrap_err(),
            TranslateError::MissingTranslation
        ));
    }
}
