//! Fixed-window text chunking with page tracking

use async_trait::async_trait;

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::pipeline::{PipelineState, Stage};
use crate::types::{Chunk, PageText};

/// Sliding-window chunker measured in characters
///
/// Each page is split independently: windows of `chunk_size` characters start
/// every `chunk_size - chunk_overlap` characters, and the last window is cut
/// at the end of the page.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl ChunkSplitter {
    /// Create a splitter; fails unless `0 <= chunk_overlap < chunk_size`
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        ChunkingConfig {
            chunk_size,
            chunk_overlap,
        }
        .validate()?;

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Create a splitter from configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Window width in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters shared by consecutive windows
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split pages into chunks, numbering chunks across the whole document
    ///
    /// Blank pages produce no chunks.
    pub fn split(&self, pages: &[PageText]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in pages {
            if page.text.trim().is_empty() {
                tracing::debug!("Skipping blank page {}", page.page_number);
                continue;
            }
            for window in self.windows(&page.text) {
                let chunk_index = chunks.len() as u32;
                chunks.push(Chunk::new(page.page_number, chunk_index, window));
            }
        }

        chunks
    }

    /// Window slices over one text
    pub fn windows<'a>(&self, text: &'a str) -> Vec<&'a str> {
        // Byte offset of every char boundary, including the end of the text
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = boundaries.len() - 1;
        if char_len == 0 {
            return Vec::new();
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut windows = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(char_len);
            windows.push(&text[boundaries[start]..boundaries[end]]);
            if end == char_len {
                break;
            }
            start += step;
        }

        windows
    }
}

#[async_trait]
impl Stage for ChunkSplitter {
    fn name(&self) -> &'static str {
        "chunk_pages"
    }

    async fn run(&self, state: &mut PipelineState) -> Result<()> {
        let chunks = self.split(state.pages()?);
        tracing::info!(
            "Split document into {} chunks (size: {}, overlap: {})",
            chunks.len(),
            self.chunk_size,
            self.chunk_overlap
        );
        state.set_chunks(chunks)
    }
}
