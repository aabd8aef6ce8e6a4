//! Retrieval stage: top-k chunks for the question

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::pipeline::{PipelineState, Stage};
use crate::providers::EmbeddingProvider;

/// Embeds the question and selects the `top_k` most similar chunks
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self { embedder, top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

#[async_trait]
impl Stage for Retriever {
    fn name(&self) -> &'static str {
        "retrieve"
    }

    async fn run(&self, state: &mut PipelineState) -> Result<()> {
        let index = state.index()?;
        if index.is_empty() {
            return Err(Error::retrieval(
                "document produced no searchable text (empty index)",
            ));
        }

        let query_vector = self
            .embedder
            .embed(state.query())
            .await
            .map_err(|e| Error::retrieval(format!("query embedding failed: {}", e)))?;

        let retrieved = index.search(&query_vector, self.top_k)?;

        tracing::info!(
            "Retrieved {} of {} chunks from {} (top_k: {})",
            retrieved.len(),
            index.len(),
            index.name(),
            self.top_k
        );
        if let Some(best) = retrieved.first() {
            tracing::debug!(
                "Best match: chunk {} on page {} (similarity: {:.3})",
                best.chunk.chunk_index,
                best.chunk.page_number,
                best.similarity
            );
        }

        state.set_retrieved(retrieved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fake::HashEmbedder;
    use crate::retrieval::FlatIndex;
    use crate::types::Chunk;

    fn indexed_state(query: &str, texts: &[&str]) -> PipelineState {
        let index = FlatIndex::build(texts.iter().enumerate().map(|(i, text)| {
            (Chunk::new(1, i as u32, *text), HashEmbedder::vector_for(text))
        }))
        .unwrap();

        let mut state = PipelineState::new("doc.txt", query);
        state.set_index(Box::new(index)).unwrap();
        state
    }

    #[tokio::test]
    async fn test_returns_top_k_best_first() {
        let retriever = Retriever::new(Arc::new(HashEmbedder::new()), 2);
        let mut state = indexed_state("zzz", &["aaaa", "zzzz", "zzaa", "bbbb"]);

        retriever.run(&mut state).await.unwrap();

        let retrieved = state.retrieved().unwrap();
        assert_eq!(retrieved.len(), 2);
        assert_eq!(retrieved[0].chunk.content, "zzzz");
        assert_eq!(retrieved[1].chunk.content, "zzaa");
    }

    #[tokio::test]
    async fn test_fewer_chunks_than_k() {
        let retriever = Retriever::new(Arc::new(HashEmbedder::new()), 5);
        let mut state = indexed_state("hello", &["hello", "world"]);

        retriever.run(&mut state).await.unwrap();
        assert_eq!(state.retrieved().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_index_fails_without_embedding() {
        let embedder = Arc::new(HashEmbedder::new());
        let retriever = Retriever::new(embedder.clone(), 5);
        let mut state = indexed_state("hello", &[]);

        let err = retriever.run(&mut state).await.unwrap_err();
        assert!(matches!(err, Error::Retrieval(_)));
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_query_embedding_failure_is_retrieval_error() {
        let retriever = Retriever::new(Arc::new(HashEmbedder::failing()), 5);
        let mut state = indexed_state("hello", &["hello"]);

        let err = retriever.run(&mut state).await.unwrap_err();
        assert!(matches!(err, Error::Retrieval(ref msg) if msg.starts_with("query embedding failed")));
    }
}
