//! The document question-answering pipeline
//!
//! ingest_document -> chunk_pages -> embed_and_index -> retrieve -> generate_answer

use std::path::Path;
use std::sync::Arc;

use crate::config::{ChunkingConfig, RagConfig};
use crate::error::Result;
use crate::generation::AnswerGenerator;
use crate::ingestion::{ChunkSplitter, DocumentLoader, DocumentParser};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::{IndexBuilder, Retriever};

use super::chain::Pipeline;
use super::state::{PipelineOutcome, PipelineState};

/// Five-stage pipeline wired to its collaborators
///
/// Built once and shared; every call to [`RagPipeline::run`] gets its own
/// state and index.
pub struct RagPipeline {
    chain: Pipeline,
    top_k: usize,
}

impl RagPipeline {
    /// Wire the stages; invalid chunking parameters fail here, before any
    /// provider is called
    pub fn new(
        chunking: &ChunkingConfig,
        top_k: usize,
        parser: Arc<dyn DocumentParser>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        let splitter = ChunkSplitter::from_config(chunking)?;

        let chain = Pipeline::builder()
            .then(DocumentLoader::new(parser))
            .then(splitter)
            .then(IndexBuilder::new(Arc::clone(&embedder)))
            .then(Retriever::new(embedder, top_k))
            .then(AnswerGenerator::new(llm))
            .build()?;

        Ok(Self { chain, top_k })
    }

    /// Wire the stages from configuration
    pub fn from_config(
        config: &RagConfig,
        parser: Arc<dyn DocumentParser>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        Self::new(&config.chunking, config.retrieval.top_k, parser, embedder, llm)
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.chain.stage_names()
    }

    /// Maximum number of chunks handed to the generator
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer `query` from the document at `path`
    pub async fn run(&self, path: &Path, query: &str) -> Result<PipelineOutcome> {
        let mut state = PipelineState::new(path, query);
        self.run_state(&mut state).await?;
        state.into_outcome()
    }

    /// Run against a caller-owned state, leaving the stage trace inspectable
    /// after a failure
    pub async fn run_state(&self, state: &mut PipelineState) -> Result<()> {
        self.chain.invoke(state).await
    }
}
