//! Application state for the HTTP server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::ingestion::{DocumentParser, FileParser};
use crate::pipeline::RagPipeline;
use crate::providers::{self, EmbeddingProvider, LlmProvider};

/// Shared application state
///
/// Holds only immutable collaborators; every request builds its own pipeline
/// state and index.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RagConfig,
    pipeline: RagPipeline,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
}

impl AppState {
    /// Create state with the providers selected by configuration
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!(
            "Initializing application state (embeddings: {:?}/{}, llm: {:?}/{})",
            config.embeddings.provider,
            config.embeddings.model,
            config.llm.provider,
            config.llm.model
        );

        let embedder = providers::build_embedder(&config.embeddings)?;
        let llm = providers::build_llm(&config.llm)?;
        Self::with_providers(config, Arc::new(FileParser::new()), embedder, llm)
    }

    /// Create state around explicit collaborators
    pub fn with_providers(
        config: RagConfig,
        parser: Arc<dyn DocumentParser>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        let pipeline =
            RagPipeline::from_config(&config, parser, Arc::clone(&embedder), Arc::clone(&llm))?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pipeline,
                embedder,
                llm,
            }),
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn pipeline(&self) -> &RagPipeline {
        &self.inner.pipeline
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }
}
