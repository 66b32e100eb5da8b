//! Conversation message types.
//!
//! One `ChatMessage` is one turn in the AI-generation conversation
//! embedded in a session. Messages are append-only: they are never
//! edited or deleted individually, only via whole-session deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the role of a message in the AI conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant (generated source or an error text).
    Assistant,
}

/// A single turn in the AI conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message. For assistant turns this is either
    /// generated source code or an `Error:`-prefixed diagnostic.
    pub content: String,
    /// Timestamp assigned at write time.
    pub timestamp: DateTime<Utc>,
    /// Optional embedded image payload as a data URI (user turns only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ChatMessage {
    /// Creates a user message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            image: None,
        }
    }

    /// Creates a user message carrying an image data URI.
    pub fn user_with_image(content: impl Into<String>, image_data_uri: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            image: Some(image_data_uri.into()),
        }
    }

    /// Creates an assistant message stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            image: None,
        }
    }
}
