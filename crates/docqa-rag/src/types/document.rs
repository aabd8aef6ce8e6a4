//! Page and chunk types with source tracking for attribution

use serde::{Deserialize, Serialize};

/// Text of one logical page, as produced by the document parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Extracted text
    pub text: String,
}

impl PageText {
    /// Create a page
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }

    /// Length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A bounded window of page text, the unit of embedding and retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Page the chunk was cut from
    pub page_number: u32,
    /// Running index across the whole document, starting at 0
    pub chunk_index: u32,
    /// Chunk text
    pub content: String,
}

impl Chunk {
    /// Create a chunk
    pub fn new(page_number: u32, chunk_index: u32, content: impl Into<String>) -> Self {
        Self {
            page_number,
            chunk_index,
            content: content.into(),
        }
    }

    /// Length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// A chunk selected by the retriever, with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// The matched chunk
    pub chunk: Chunk,
    /// Cosine similarity (-1.0 to 1.0, higher is more similar)
    pub similarity: f32,
}
