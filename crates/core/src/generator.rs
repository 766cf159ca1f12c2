//! Generator trait — the abstraction over the external generative model.
//!
//! A Generator knows how to send a prompt plus an image to a multimodal
//! model and get text back, either as a single stateless call or as a
//! replayed conversation ending in one multimodal turn.
//!
//! Implementations: Gemini (REST), scripted stubs in tests.

use async_trait::async_trait;

use crate::error::GeneratorError;
use crate::media::ImagePayload;

/// The external text/image-conditioned generative model.
///
/// The solver calls `generate()` or `converse()` without knowing which
/// backend is configured — pure polymorphism. Exactly one upstream attempt
/// is made per call; retry policy belongs to the caller's contract, and the
/// documented behavior is no retry at all.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this backend (e.g., "gemini").
    fn name(&self) -> &str;

    /// Stateless generation: one prompt, one image, one text response.
    async fn generate(
        &self,
        prompt: &str,
        image: &ImagePayload,
    ) -> std::result::Result<String, GeneratorError>;

    /// Conversational generation against a fresh session.
    ///
    /// `replay` is resent in order as outbound messages to reconstruct
    /// context, then `prompt` and `image` are sent as the final multimodal
    /// turn. The response to that final turn is returned verbatim.
    async fn converse(
        &self,
        replay: &[String],
        prompt: &str,
        image: &ImagePayload,
    ) -> std::result::Result<String, GeneratorError>;

    /// Health check — can we reach the backend with the configured key?
    async fn health_check(&self) -> std::result::Result<bool, GeneratorError> {
        Ok(true)
    }
}
