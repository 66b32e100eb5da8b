//! Error types shared across the scadcollab workspace.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the session engine.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CollabError {
    /// Entity not found with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The backing document store cannot be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A generation provider has no credential configured
    #[error("Provider not configured: {provider} (add its API key to secret.json)")]
    ProviderNotConfigured { provider: &'static str },

    /// A generation provider returned a non-success HTTP status
    #[error("Provider error ({status}): {body}")]
    Provider { status: u16, body: String },

    /// The generated source failed the editor's syntax check
    #[error("Syntax check failed: {0}")]
    SyntaxCheck(String),

    /// Rendering failed after exhausting retries
    #[error("Render failed: {0}")]
    RenderFailed(String),

    /// Access denied (session not shared with the requesting user)
    #[error("Security error: {0}")]
    Security(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CollabError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a StoreUnavailable error
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    /// Creates a Security error
    pub fn security(message: impl Into<String>) -> Self {
        Self::Security(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a StoreUnavailable error
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Check if this is a ProviderNotConfigured error
    pub fn is_provider_not_configured(&self) -> bool {
        matches!(self, Self::ProviderNotConfigured { .. })
    }

    /// Check if this is a provider HTTP error
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }
}

impl From<std::io::Error> for CollabError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CollabError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for CollabError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, CollabError>`.
pub type Result<T> = std::result::Result<T, CollabError>;
