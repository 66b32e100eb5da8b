//! Source editor/renderer boundary.
//!
//! The actual editor and render backend live outside this engine;
//! the orchestrator drives them through this trait.

use async_trait::async_trait;
use scadcollab_core::error::Result;

/// Options for a render pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Render a preview rather than a full-quality pass.
    pub preview: bool,
    /// Start immediately instead of debouncing behind edits.
    pub immediate: bool,
}

/// The external source-editing and rendering collaborator.
#[async_trait]
pub trait SourceEditor: Send + Sync {
    /// Current contents of the source buffer.
    async fn source(&self) -> String;

    /// Replaces the source buffer.
    async fn set_source(&self, source: &str) -> Result<()>;

    /// Validates the buffer; as a side effect populates customizer
    /// parameters. Fails with `SyntaxCheck` on invalid source.
    async fn check_syntax(&self) -> Result<()>;

    /// Renders the buffer. Fails with `RenderFailed` on render error.
    async fn render(&self, options: RenderOptions) -> Result<()>;

    /// Exports the rendered model.
    async fn export(&self) -> Result<Vec<u8>>;
}
