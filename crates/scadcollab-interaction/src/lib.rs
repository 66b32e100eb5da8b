//! Provider and pipeline layer of the scadcollab session engine.
//!
//! Talks to external generation services (text and vision), builds
//! instructions, extracts code from responses, and drives the
//! generation pipeline against the external editor/renderer.

pub mod config;
pub mod editor;
pub mod extract;
pub mod gemini_provider;
pub mod openai_vision_provider;
pub mod orchestrator;
pub mod prompt;
pub mod provider;

pub use editor::{RenderOptions, SourceEditor};
pub use gemini_provider::GeminiTextProvider;
pub use openai_vision_provider::OpenAiVisionProvider;
pub use orchestrator::{GenerationOrchestrator, GenerationPhase};
pub use provider::{
    GenerationRequest, ImageAttachment, ImagePrompt, TextPrompt, TextProvider, Turn, TurnRole,
    VisionProvider,
};
