//! Solve/explain orchestration for inkmath.
//!
//! `Solver` ties the pieces together: it renders the prompt, makes exactly
//! one generator call, and routes the raw text through normalization (for
//! solve) or returns it verbatim (for explain). It holds no per-request
//! state — every call is independent.

pub mod normalize;
pub mod prompt;
mod relaxed;

pub use normalize::normalize;

use std::sync::Arc;

use inkmath_core::{
    AnswerRecord, ConversationTurn, Generator, GeneratorError, ImagePayload, VariableBindings,
};
use tracing::debug;

/// Orchestrates solve and explain requests against a configured generator.
pub struct Solver {
    generator: Arc<dyn Generator>,
}

impl Solver {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Solve the most recent drawing in the image.
    ///
    /// One generator attempt, no retry. A generator failure surfaces as
    /// `GeneratorError`; an unparseable response from a successful call is
    /// absorbed by the normalizer into the sentinel record — the two
    /// failure classes are deliberately distinct.
    pub async fn solve(
        &self,
        image: &ImagePayload,
        variables: &VariableBindings,
    ) -> Result<Vec<AnswerRecord>, GeneratorError> {
        let prompt = prompt::solve_prompt(variables);
        debug!(
            prompt_len = prompt.len(),
            image_bytes = image.bytes.len(),
            variables = variables.len(),
            "Requesting solution"
        );

        let raw = self.generator.generate(&prompt, image).await?;
        debug!(raw_len = raw.len(), "Generator responded");

        Ok(normalize::normalize(&raw))
    }

    /// Continue an explanation conversation about a solution.
    ///
    /// History replay is role-agnostic: both user and model turns are
    /// resent as outbound messages against a fresh session, preserving only
    /// order. The final turn carries the formatting template, the question,
    /// and the image; the response is returned verbatim with no
    /// normalization.
    pub async fn explain(
        &self,
        image: &ImagePayload,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<String, GeneratorError> {
        let replay: Vec<String> = history.iter().map(|turn| turn.content.clone()).collect();
        let prompt = prompt::explain_prompt(question);
        debug!(
            prompt_len = prompt.len(),
            turns = history.len(),
            "Requesting explanation"
        );

        self.generator.converse(&replay, &prompt, image).await
    }
}
