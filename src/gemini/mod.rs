pub mod dto;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::GeminiConfig;
use crate::error::AppError;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

pub struct GeminiHttpClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiHttpClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl TextGenerator for GeminiHttpClient {
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/{}:generateContent", API_BASE, self.config.model);
        let request_body = dto::GenerateContentRequest::from_prompt(prompt);

        let response = self.client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Gemini API error {}: {}", status, body)));
        }

        let body_text = response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to read Gemini response: {}", e)))?;
        let parsed: dto::GenerateContentResponse = serde_json::from_str(&body_text)
            .map_err(|e| AppError::Upstream(format!("Failed to parse Gemini response: {}", e)))?;

        parsed
            .text()
            .ok_or_else(|| AppError::Upstream("Gemini response contained no text".to_string()))
    }
}

/// Stands in when no API key is configured; every request fails.
pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, AppError> {
        Err(AppError::Config("GEMINI_API_KEY is not set".to_string()))
    }
}
