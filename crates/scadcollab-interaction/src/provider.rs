//! Generation request shapes and provider traits.
//!
//! The request is a tagged union: text-only prompts go to a
//! generative text provider carrying just the built instruction,
//! image-bearing prompts go to a vision chat provider carrying the
//! prior transcript plus the new mixed text+image turn. Dispatch is
//! exhaustive, so a new modality is a compile-time-checked extension.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use scadcollab_core::error::Result;
use scadcollab_core::session::{ChatMessage, MessageRole};

/// An image supplied alongside a prompt.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Encodes the image as a `data:` URI for providers that take
    /// inline images.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            BASE64_STANDARD.encode(&self.bytes)
        )
    }
}

/// Role of a prior conversation turn, in provider vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

impl From<MessageRole> for TurnRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => TurnRole::User,
            MessageRole::Assistant => TurnRole::Assistant,
        }
    }
}

/// One prior conversation turn forwarded to the vision provider.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn from_message(message: &ChatMessage) -> Self {
        Self {
            role: message.role.into(),
            text: message.content.clone(),
        }
    }
}

/// Text-only generation request: the instruction is the sole content.
#[derive(Debug, Clone)]
pub struct TextPrompt {
    pub instruction: String,
}

/// Image-bearing generation request: prior turns plus a mixed
/// text+image current turn.
#[derive(Debug, Clone)]
pub struct ImagePrompt {
    pub instruction: String,
    pub prior_turns: Vec<Turn>,
    pub prompt: String,
    pub image_data_uri: String,
}

/// A generation request, dispatched by shape.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Text(TextPrompt),
    Image(ImagePrompt),
}

/// A text-only generative provider.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Sends the instruction and returns the raw response text.
    async fn generate(&self, prompt: &TextPrompt) -> Result<String>;
}

/// A vision-capable chat provider.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Sends the conversation plus image and returns the raw
    /// response text.
    async fn generate(&self, prompt: &ImagePrompt) -> Result<String>;
}
