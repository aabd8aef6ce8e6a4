//! Provider abstractions for embeddings and answer generation
//!
//! The pipeline only sees the traits; the concrete backend (local Ollama or an
//! OpenAI-compatible API) is picked from configuration at startup.

pub mod embedding;
pub mod http;
pub mod llm;
pub mod ollama;
pub mod openai;

#[cfg(test)]
pub(crate) mod fake;

use std::sync::Arc;

use crate::config::{EmbeddingConfig, LlmConfig, ProviderKind};
use crate::error::Result;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;

/// Build the embedding provider selected by configuration
pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        ProviderKind::Ollama => Arc::new(ollama::OllamaEmbedder::new(config)?),
        ProviderKind::OpenAi => Arc::new(openai::OpenAiEmbedder::new(config)?),
    };
    tracing::info!(
        "Embedding provider: {} (model: {})",
        provider.name(),
        config.model
    );
    Ok(provider)
}

/// Build the language model provider selected by configuration
pub fn build_llm(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderKind::Ollama => Arc::new(ollama::OllamaLlm::new(config)?),
        ProviderKind::OpenAi => Arc::new(openai::OpenAiLlm::new(config)?),
    };
    tracing::info!("LLM provider: {} (model: {})", provider.name(), provider.model());
    Ok(provider)
}
