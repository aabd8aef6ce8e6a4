//! Answer generation stage

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::pipeline::{PipelineState, Stage};
use crate::providers::LlmProvider;

use super::prompt::PromptBuilder;

/// Builds the grounded prompt from retrieved chunks and asks the LLM
pub struct AnswerGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Stage for AnswerGenerator {
    fn name(&self) -> &'static str {
        "generate_answer"
    }

    async fn run(&self, state: &mut PipelineState) -> Result<()> {
        let retrieved = state.retrieved()?;
        if retrieved.is_empty() {
            tracing::warn!("Generating without context, retrieval returned no chunks");
        }

        let prompt = PromptBuilder::build_prompt(state.query(), retrieved);
        tracing::debug!(
            "Prompt has {} characters from {} chunks",
            prompt.chars().count(),
            retrieved.len()
        );

        let answer = self.llm.generate(&prompt).await.map_err(|e| match e {
            Error::Generation(_) => e,
            other => Error::generation(other.to_string()),
        })?;

        tracing::info!(
            "Generated {} character answer with {} ({})",
            answer.chars().count(),
            self.llm.name(),
            self.llm.model()
        );

        state.set_answer(answer)
    }
}
