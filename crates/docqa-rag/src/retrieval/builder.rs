//! Embedding stage: chunks to a searchable index

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::pipeline::{PipelineState, Stage};
use crate::providers::EmbeddingProvider;

use super::index::{FlatIndex, VectorIndex};

/// Embeds every chunk and builds the request's vector index
pub struct IndexBuilder {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }
}

#[async_trait]
impl Stage for IndexBuilder {
    fn name(&self) -> &'static str {
        "embed_and_index"
    }

    async fn run(&self, state: &mut PipelineState) -> Result<()> {
        let chunks = state.chunks()?.to_vec();

        if chunks.is_empty() {
            tracing::warn!("No chunks to embed, building an empty index");
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| match e {
                Error::Embedding(_) => e,
                other => Error::embedding(other.to_string()),
            })?;

        if embeddings.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "{} returned {} embeddings for {} chunks",
                self.embedder.name(),
                embeddings.len(),
                chunks.len()
            )));
        }

        let index = FlatIndex::build(chunks.into_iter().zip(embeddings))?;
        tracing::info!(
            "Indexed {} chunks ({:?} dimensions) with {}",
            index.len(),
            index.dimensions(),
            self.embedder.name()
        );

        state.set_index(Box::new(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fake::HashEmbedder;
    use crate::types::Chunk;

    fn state_with_chunks(chunks: Vec<Chunk>) -> PipelineState {
        let mut state = PipelineState::new("doc.txt", "q");
        state.set_chunks(chunks).unwrap();
        state
    }

    #[tokio::test]
    async fn test_indexes_every_chunk() {
        let embedder = Arc::new(HashEmbedder::new());
        let builder = IndexBuilder::new(embedder.clone());
        let mut state = state_with_chunks(vec![
            Chunk::new(1, 0, "alpha"),
            Chunk::new(1, 1, "beta"),
            Chunk::new(2, 2, "gamma"),
        ]);

        builder.run(&mut state).await.unwrap();

        assert_eq!(state.index().unwrap().len(), 3);
        assert_eq!(embedder.calls(), 3);
    }

    #[tokio::test]
    async fn test_no_chunks_builds_empty_index() {
        let builder = IndexBuilder::new(Arc::new(HashEmbedder::new()));
        let mut state = state_with_chunks(Vec::new());

        builder.run(&mut state).await.unwrap();
        assert!(state.index().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_leaves_no_index() {
        let builder = IndexBuilder::new(Arc::new(HashEmbedder::failing()));
        let mut state = state_with_chunks(vec![Chunk::new(1, 0, "alpha")]);

        let err = builder.run(&mut state).await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(state.index().is_err());
    }

    struct ShortBatch;

    #[async_trait]
    impl EmbeddingProvider for ShortBatch {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0])
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0]])
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "short-batch"
        }
    }

    #[tokio::test]
    async fn test_missing_embeddings_rejected() {
        let builder = IndexBuilder::new(Arc::new(ShortBatch));
        let mut state = state_with_chunks(vec![Chunk::new(1, 0, "a"), Chunk::new(1, 1, "b")]);

        let err = builder.run(&mut state).await.unwrap_err();
        assert!(matches!(err, Error::Embedding(ref msg) if msg.contains("1 embeddings for 2 chunks")));
    }
}
