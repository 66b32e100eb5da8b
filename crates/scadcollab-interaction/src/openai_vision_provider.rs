//! OpenAiVisionProvider - Chat Completions implementation for
//! image-bearing prompts.
//!
//! Unlike the text path, this provider forwards the prior transcript
//! converted to chat roles, then the new turn as mixed text+image
//! content (data URL). Requires its own credential; an image-bearing
//! prompt never falls back to the text-only provider.

use crate::config::load_secret_config;
use crate::provider::{ImagePrompt, Turn, TurnRole, VisionProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scadcollab_core::error::{CollabError, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_VISION_MODEL: &str = "gpt-4o";
const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Vision provider backed by the OpenAI-style Chat Completions API.
#[derive(Clone)]
pub struct OpenAiVisionProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiVisionProvider {
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
    /// Model name defaults to `gpt-4o` if not specified. A missing
    /// `vision` entry is `ProviderNotConfigured`.
    pub fn try_from_config() -> Result<Self> {
        let secret_config = load_secret_config()?;

        let vision_config = secret_config
            .vision
            .ok_or(CollabError::ProviderNotConfigured { provider: "vision" })?;

        let model = vision_config
            .model_name
            .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string());

        Ok(Self::new(vision_config.api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(BASE_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| CollabError::internal(format!("Vision API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read vision error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            CollabError::internal(format!("Failed to parse vision response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl VisionProvider for OpenAiVisionProvider {
    async fn generate(&self, prompt: &ImagePrompt) -> Result<String> {
        let mut messages = vec![ChatRequestMessage {
            role: "system".to_string(),
            content: MessagePayload::Text(prompt.instruction.clone()),
        }];

        for turn in &prompt.prior_turns {
            messages.push(ChatRequestMessage {
                role: turn_role(turn).to_string(),
                content: MessagePayload::Text(turn.text.clone()),
            });
        }

        messages.push(ChatRequestMessage {
            role: "user".to_string(),
            content: MessagePayload::Parts(vec![
                ContentPart::Text {
                    text: prompt.prompt.clone(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: prompt.image_data_uri.clone(),
                    },
                },
            ]),
        });

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
        };
        self.send_request(&request).await
    }
}

fn turn_role(turn: &Turn) -> &'static str {
    match turn.role {
        TurnRole::User => "user",
        TurnRole::Assistant => "assistant",
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatRequestMessage>,
}

#[derive(Serialize)]
struct ChatRequestMessage {
    role: String,
    content: MessagePayload,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessagePayload {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .and_then(|mut choices| {
            if choices.is_empty() {
                None
            } else {
                Some(choices.remove(0))
            }
        })
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| CollabError::internal("vision response contained no message content"))
}

fn map_http_error(status: StatusCode, body: String) -> CollabError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .ok()
        .and_then(|wrapper| wrapper.error.message)
        .unwrap_or_else(|| body.clone());

    CollabError::Provider {
        status: status.as_u16(),
        body: message,
    }
}
