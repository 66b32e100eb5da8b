//! Generation pipeline state machine.
//!
//! Turns a natural-language prompt (optionally with an image) into
//! source code: echo the user turn, build the instruction, call the
//! matching provider, extract code, persist, then drive the external
//! editor through validate and a bounded render retry loop.
//!
//! Provider and extraction failures become `Error:`-prefixed
//! assistant messages in the transcript; syntax-check failures are
//! logged and the flow continues; render failures are retried and,
//! once exhausted, logged and abandoned without a chat message.

use crate::editor::{RenderOptions, SourceEditor};
use crate::extract::extract_code;
use crate::prompt::build_instruction;
use crate::provider::{
    GenerationRequest, ImageAttachment, ImagePrompt, TextPrompt, TextProvider, Turn, TurnRole,
    VisionProvider,
};
use scadcollab_core::backoff::RetryPolicy;
use scadcollab_core::error::{CollabError, Result};
use scadcollab_core::session::{ChatMessage, SessionPatch, SessionStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Marker prefixing assistant messages that report a failure.
const ERROR_PREFIX: &str = "Error: ";

/// Where a generation run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    Idle,
    AwaitingProvider,
    ExtractingCode,
    Validating,
    Rendering,
    Done,
    Failed,
}

/// Drives one session's prompt-to-render pipeline.
pub struct GenerationOrchestrator {
    session_id: Option<String>,
    store: Option<Arc<dyn SessionStore>>,
    text_provider: Option<Arc<dyn TextProvider>>,
    vision_provider: Option<Arc<dyn VisionProvider>>,
    editor: Arc<dyn SourceEditor>,
    retry: RetryPolicy,
    transcript: RwLock<Vec<ChatMessage>>,
    phase: RwLock<GenerationPhase>,
    loading: AtomicBool,
}

impl GenerationOrchestrator {
    pub fn new(editor: Arc<dyn SourceEditor>) -> Self {
        Self {
            session_id: None,
            store: None,
            text_provider: None,
            vision_provider: None,
            editor,
            retry: RetryPolicy::default(),
            transcript: RwLock::new(Vec::new()),
            phase: RwLock::new(GenerationPhase::Idle),
            loading: AtomicBool::new(false),
        }
    }

    /// Attaches the orchestrator to a persisted session.
    pub fn with_store(mut self, store: Arc<dyn SessionStore>, session_id: impl Into<String>) -> Self {
        self.store = Some(store);
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_text_provider(mut self, provider: Arc<dyn TextProvider>) -> Self {
        self.text_provider = Some(provider);
        self
    }

    pub fn with_vision_provider(mut self, provider: Arc<dyn VisionProvider>) -> Self {
        self.vision_provider = Some(provider);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the local transcript, e.g. when loading or switching
    /// sessions.
    pub async fn set_transcript(&self, messages: Vec<ChatMessage>) {
        *self.transcript.write().await = messages;
    }

    /// Snapshot of the local transcript.
    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.read().await.clone()
    }

    pub async fn phase(&self) -> GenerationPhase {
        *self.phase.read().await
    }

    /// True while a generation run is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Runs the full pipeline for one prompt.
    ///
    /// Fire-and-forget from the caller's perspective: failures are
    /// observable through the transcript and the phase, never
    /// propagated.
    pub async fn generate(&self, prompt: &str, image: Option<ImageAttachment>) {
        self.generate_with_options(prompt, image, false).await;
    }

    /// Like [`generate`](Self::generate), optionally skipping the
    /// user echo when the turn is already in the transcript.
    pub async fn generate_with_options(
        &self,
        prompt: &str,
        image: Option<ImageAttachment>,
        skip_user_echo: bool,
    ) {
        self.loading.store(true, Ordering::SeqCst);

        // Prior turns are captured before the echo so the new turn is
        // not duplicated in the provider request.
        let mut prior_turns: Vec<Turn> = self
            .transcript
            .read()
            .await
            .iter()
            .map(Turn::from_message)
            .collect();

        // With the echo skipped the transcript already ends in this
        // prompt; drop it so it only travels as the current turn.
        if skip_user_echo {
            let is_pending_turn = prior_turns
                .last()
                .is_some_and(|turn| turn.role == TurnRole::User && turn.text == prompt);
            if is_pending_turn {
                prior_turns.pop();
            }
        }

        if !skip_user_echo {
            let message = match &image {
                Some(image) => ChatMessage::user_with_image(prompt, image.to_data_uri()),
                None => ChatMessage::user(prompt),
            };
            // Optimistic local append before any network call: the
            // user's intent stays visible even if everything after
            // this fails.
            self.transcript.write().await.push(message.clone());
            self.persist_message(message).await;
        }

        match self.run_provider_phase(prompt, image, prior_turns).await {
            Ok(code) => {
                self.run_render_phase(&code).await;
            }
            Err(err) => {
                tracing::warn!("generation failed: {err}");
                let message = ChatMessage::assistant(format!("{ERROR_PREFIX}{err}"));
                self.transcript.write().await.push(message.clone());
                self.persist_message(message).await;
                self.set_phase(GenerationPhase::Failed).await;
            }
        }

        self.loading.store(false, Ordering::SeqCst);
    }

    /// Steps 2–6: build the instruction, call the provider, extract
    /// the code, persist it. Any error here becomes a chat message.
    async fn run_provider_phase(
        &self,
        prompt: &str,
        image: Option<ImageAttachment>,
        prior_turns: Vec<Turn>,
    ) -> Result<String> {
        self.set_phase(GenerationPhase::AwaitingProvider).await;

        let current_source = self.editor.source().await;
        let instruction = build_instruction(prompt, &current_source);

        let request = match image {
            Some(image) => GenerationRequest::Image(ImagePrompt {
                instruction,
                prior_turns,
                prompt: prompt.to_string(),
                image_data_uri: image.to_data_uri(),
            }),
            None => GenerationRequest::Text(TextPrompt { instruction }),
        };

        let response = match &request {
            GenerationRequest::Text(text_prompt) => {
                let provider = self
                    .text_provider
                    .as_ref()
                    .ok_or(CollabError::ProviderNotConfigured { provider: "gemini" })?;
                provider.generate(text_prompt).await?
            }
            GenerationRequest::Image(image_prompt) => {
                // An image-bearing prompt never falls back to the
                // text-only provider.
                let provider = self
                    .vision_provider
                    .as_ref()
                    .ok_or(CollabError::ProviderNotConfigured { provider: "vision" })?;
                provider.generate(image_prompt).await?
            }
        };

        self.set_phase(GenerationPhase::ExtractingCode).await;
        let code = extract_code(&response);

        let message = ChatMessage::assistant(code.clone());
        self.transcript.write().await.push(message.clone());
        self.persist_message(message).await;
        self.persist_code(&code).await;

        Ok(code)
    }

    /// Steps 7–9: hand the code to the editor, validate, render with
    /// bounded retry. Nothing here produces a chat message.
    async fn run_render_phase(&self, code: &str) {
        if let Err(err) = self.editor.set_source(code).await {
            tracing::error!("failed to hand code to the editor: {err}");
            self.set_phase(GenerationPhase::Failed).await;
            return;
        }

        self.set_phase(GenerationPhase::Validating).await;
        if let Err(err) = self.editor.check_syntax().await {
            // Non-fatal: customizer parameters may simply be
            // unavailable for this model.
            tracing::warn!("syntax check failed: {err}");
        }

        self.set_phase(GenerationPhase::Rendering).await;
        let options = RenderOptions {
            preview: true,
            immediate: true,
        };

        for attempt in self.retry.attempts() {
            match self.editor.render(options).await {
                Ok(()) => {
                    self.set_phase(GenerationPhase::Done).await;
                    return;
                }
                Err(err) => {
                    tracing::warn!("render attempt {attempt} failed: {err}");
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.delay(attempt)).await;
                    }
                }
            }
        }

        // Exhausted: logged only, never surfaced as a chat message.
        tracing::error!(
            "render failed after {} attempts, giving up",
            self.retry.max_attempts
        );
        self.set_phase(GenerationPhase::Failed).await;
    }

    async fn set_phase(&self, phase: GenerationPhase) {
        *self.phase.write().await = phase;
    }

    /// Persists one transcript message. A write failure keeps the
    /// optimistic local state and is logged; the local transcript may
    /// then diverge from the persisted one.
    async fn persist_message(&self, message: ChatMessage) {
        let (Some(store), Some(session_id)) = (&self.store, &self.session_id) else {
            return;
        };
        if let Err(err) = store.append_message(session_id, message).await {
            tracing::warn!("failed to persist message for {session_id}: {err}");
        }
    }

    async fn persist_code(&self, code: &str) {
        let (Some(store), Some(session_id)) = (&self.store, &self.session_id) else {
            return;
        };
        let patch = SessionPatch {
            model_code: Some(code.to_string()),
            ..Default::default()
        };
        if let Err(err) = store.update(session_id, patch).await {
            tracing::warn!("failed to persist code for {session_id}: {err}");
        }
    }
}
