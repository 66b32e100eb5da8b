//! GeminiTextProvider - Direct REST API implementation for Gemini.
//!
//! Calls the Gemini `generateContent` REST API directly. Configuration
//! is loaded from secret.json. The built instruction travels as the
//! sole user content block; prior conversation turns are not forwarded
//! on this path.

use crate::config::load_secret_config;
use crate::provider::{TextPrompt, TextProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scadcollab_core::error::{CollabError, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Response given to the caller when the API returns a well-formed
/// body with no text candidates.
const EMPTY_RESPONSE_FALLBACK: &str = "No response generated";

/// Text provider backed by the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiTextProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiTextProvider {
    /// Creates a new provider with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Loads configuration from secret.json.
    ///
    /// Model name defaults to `gemini-3-flash-preview` if not
    /// specified. A missing `gemini` entry is `ProviderNotConfigured`.
    pub fn try_from_config() -> Result<Self> {
        let secret_config = load_secret_config()?;

        let gemini_config = secret_config
            .gemini
            .ok_or(CollabError::ProviderNotConfigured { provider: "gemini" })?;

        let model = gemini_config
            .model_name
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        Ok(Self::new(gemini_config.api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| CollabError::internal(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|err| {
                CollabError::internal(format!("Failed to parse Gemini response: {err}"))
            })?;

        Ok(extract_text_response(parsed))
    }
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    async fn generate(&self, prompt: &TextPrompt) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.instruction.clone(),
                }],
            }],
            generation_config: GenerationConfig::default(),
        };
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> String {
    response
        .candidates
        .and_then(|mut candidates| {
            if candidates.is_empty() {
                None
            } else {
                Some(candidates.remove(0))
            }
        })
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .unwrap_or_else(|| EMPTY_RESPONSE_FALLBACK.to_string())
}

fn map_http_error(status: StatusCode, body: String) -> CollabError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    CollabError::Provider {
        status: status.as_u16(),
        body: message,
    }
}
