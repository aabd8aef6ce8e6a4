//! HTTP response types

use serde::{Deserialize, Serialize};

use super::document::RetrievedChunk;

/// Response body for `POST /invoke`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeResponse {
    /// Model answer, verbatim
    pub answer: String,
    /// Chunks the answer was conditioned on, best first
    pub retrieved_docs: Vec<RetrievedDoc>,
}

impl InvokeResponse {
    /// Build a response from the generator output and the ranked chunks
    pub fn new(answer: String, retrieved: &[RetrievedChunk]) -> Self {
        Self {
            answer,
            retrieved_docs: retrieved.iter().map(RetrievedDoc::from).collect(),
        }
    }
}

/// One retrieved chunk as shown to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDoc {
    /// Chunk text
    pub content: String,
    /// Source page (1-indexed)
    pub page: u32,
    /// Running chunk index within the document
    pub chunk_index: u32,
    /// Similarity to the query
    pub similarity: f32,
}

impl From<&RetrievedChunk> for RetrievedDoc {
    fn from(retrieved: &RetrievedChunk) -> Self {
        Self {
            content: retrieved.chunk.content.clone(),
            page: retrieved.chunk.page_number,
            chunk_index: retrieved.chunk.chunk_index,
            similarity: retrieved.similarity,
        }
    }
}
