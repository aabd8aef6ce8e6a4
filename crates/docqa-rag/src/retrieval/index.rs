//! Request-scoped vector index
//!
//! `FlatIndex` scores every vector against the query. A single uploaded
//! document yields at most a few thousand chunks, where an exact scan is both
//! fast and fully deterministic.

use crate::error::{Error, Result};
use crate::types::{Chunk, RetrievedChunk};

/// Nearest-neighbour search over chunk embeddings
pub trait VectorIndex: Send + Sync {
    /// Number of vectors stored
    fn len(&self) -> usize;

    /// Check if the index holds no vectors
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector length, or `None` for an empty index
    fn dimensions(&self) -> Option<usize>;

    /// Return at most `k` chunks, best first
    ///
    /// Equal scores are ordered by chunk index so repeated queries return
    /// identical rankings.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>>;

    /// Get index name for logging
    fn name(&self) -> &str;
}

struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
    norm: f32,
}

/// Exact cosine-similarity index
pub struct FlatIndex {
    dimensions: Option<usize>,
    entries: Vec<IndexEntry>,
}

impl FlatIndex {
    /// Build an index from (chunk, vector) pairs
    ///
    /// Fails without producing an index if any vector is empty or the vector
    /// lengths disagree.
    pub fn build<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Chunk, Vec<f32>)>,
    {
        let mut dimensions = None;
        let mut entries = Vec::new();

        for (chunk, vector) in pairs {
            if vector.is_empty() {
                return Err(Error::embedding(format!(
                    "empty embedding for chunk {}",
                    chunk.chunk_index
                )));
            }
            match dimensions {
                None => dimensions = Some(vector.len()),
                Some(d) if d != vector.len() => {
                    return Err(Error::embedding(format!(
                        "embedding for chunk {} has {} dimensions, expected {}",
                        chunk.chunk_index,
                        vector.len(),
                        d
                    )));
                }
                Some(_) => {}
            }

            let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
            entries.push(IndexEntry {
                chunk,
                vector,
                norm,
            });
        }

        Ok(Self {
            dimensions,
            entries,
        })
    }

    /// Chunks in insertion order
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    fn cosine(entry: &IndexEntry, query: &[f32], query_norm: f32) -> f32 {
        if entry.norm == 0.0 || query_norm == 0.0 {
            return 0.0;
        }
        let dot: f32 = entry.vector.iter().zip(query).map(|(a, b)| a * b).sum();
        dot / (entry.norm * query_norm)
    }
}

impl VectorIndex for FlatIndex {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>> {
        let Some(dimensions) = self.dimensions else {
            return Err(Error::retrieval("cannot query an empty index"));
        };
        if query.len() != dimensions {
            return Err(Error::retrieval(format!(
                "query embedding has {} dimensions, index has {}",
                query.len(),
                dimensions
            )));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_norm = query.iter().map(|x| x * x).sum::<f32>().sqrt();

        let mut scored: Vec<(f32, &IndexEntry)> = self
            .entries
            .iter()
            .map(|entry| (Self::cosine(entry, query, query_norm), entry))
            .collect();

        scored.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .total_cmp(score_a)
                .then_with(|| a.chunk.chunk_index.cmp(&b.chunk.chunk_index))
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(similarity, entry)| RetrievedChunk {
                chunk: entry.chunk.clone(),
                similarity,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "flat-cosine"
    }
}
