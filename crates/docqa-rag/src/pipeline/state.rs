//! Shared state threaded through the pipeline stages
//!
//! Each stage output lives in its own slot. A slot is written exactly once and
//! reading it before it is written is a contract violation, reported as
//! `Error::StateContract` instead of a missing-key panic.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::retrieval::VectorIndex;
use crate::types::{Chunk, PageText, RetrievedChunk};

/// Per-request pipeline state
pub struct PipelineState {
    source_path: PathBuf,
    query: String,
    pages: Option<Vec<PageText>>,
    chunks: Option<Vec<Chunk>>,
    index: Option<Box<dyn VectorIndex>>,
    retrieved: Option<Vec<RetrievedChunk>>,
    answer: Option<String>,
    completed: Vec<&'static str>,
}

/// What the request handler takes out of a finished pipeline
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Model answer, verbatim
    pub answer: String,
    /// Chunks the generator was given, best first
    pub retrieved: Vec<RetrievedChunk>,
}

fn write_once<T>(slot: &mut Option<T>, value: T, field: &str) -> Result<()> {
    if slot.is_some() {
        return Err(Error::state_contract(format!("'{}' was already written", field)));
    }
    *slot = Some(value);
    Ok(())
}

fn read<'a, T>(slot: &'a Option<T>, field: &str) -> Result<&'a T> {
    slot.as_ref().ok_or_else(|| {
        Error::state_contract(format!("'{}' was read before the stage producing it ran", field))
    })
}

impl PipelineState {
    /// Create the state at request entry
    pub fn new(source_path: impl Into<PathBuf>, query: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            query: query.into(),
            pages: None,
            chunks: None,
            index: None,
            retrieved: None,
            answer: None,
            completed: Vec::new(),
        }
    }

    /// Document to answer from
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Question text
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Page texts written by the loader
    pub fn pages(&self) -> Result<&[PageText]> {
        read(&self.pages, "pages").map(Vec::as_slice)
    }

    pub fn set_pages(&mut self, pages: Vec<PageText>) -> Result<()> {
        write_once(&mut self.pages, pages, "pages")
    }

    /// Chunks written by the splitter
    pub fn chunks(&self) -> Result<&[Chunk]> {
        read(&self.chunks, "chunks").map(Vec::as_slice)
    }

    pub fn set_chunks(&mut self, chunks: Vec<Chunk>) -> Result<()> {
        write_once(&mut self.chunks, chunks, "chunks")
    }

    /// Index written by the index builder
    pub fn index(&self) -> Result<&dyn VectorIndex> {
        read(&self.index, "index").map(|index| &**index)
    }

    pub fn set_index(&mut self, index: Box<dyn VectorIndex>) -> Result<()> {
        write_once(&mut self.index, index, "index")
    }

    /// Ranked chunks written by the retriever
    pub fn retrieved(&self) -> Result<&[RetrievedChunk]> {
        read(&self.retrieved, "retrieved").map(Vec::as_slice)
    }

    pub fn set_retrieved(&mut self, retrieved: Vec<RetrievedChunk>) -> Result<()> {
        write_once(&mut self.retrieved, retrieved, "retrieved")
    }

    /// Answer written by the generator
    pub fn answer(&self) -> Result<&str> {
        read(&self.answer, "answer").map(String::as_str)
    }

    pub fn set_answer(&mut self, answer: String) -> Result<()> {
        write_once(&mut self.answer, answer, "answer")
    }

    /// Names of the stages that finished, in execution order
    pub fn completed_stages(&self) -> &[&'static str] {
        &self.completed
    }

    /// Most recently finished stage
    pub fn last_completed(&self) -> Option<&'static str> {
        self.completed.last().copied()
    }

    pub(crate) fn mark_completed(&mut self, stage: &'static str) {
        self.completed.push(stage);
    }

    /// Consume the state after the terminal stage
    pub fn into_outcome(self) -> Result<PipelineOutcome> {
        let answer = self
            .answer
            .ok_or_else(|| Error::state_contract("pipeline finished without an answer"))?;
        let retrieved = self
            .retrieved
            .ok_or_else(|| Error::state_contract("pipeline finished without retrieval"))?;
        Ok(PipelineOutcome { answer, retrieved })
    }
}

impl std::fmt::Debug for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineState")
            .field("source_path", &self.source_path)
            .field("query", &self.query)
            .field("pages", &self.pages.as_ref().map(Vec::len))
            .field("chunks", &self.chunks.as_ref().map(Vec::len))
            .field("index", &self.index.as_ref().map(|i| i.len()))
            .field("retrieved", &self.retrieved.as_ref().map(Vec::len))
            .field("answer", &self.answer.is_some())
            .field("completed", &self.completed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_before_write_is_rejected() {
        let state = PipelineState::new("/tmp/doc.pdf", "what?");
        assert!(matches!(state.pages(), Err(Error::StateContract(_))));
        assert!(matches!(state.chunks(), Err(Error::StateContract(_))));
        assert!(matches!(state.index(), Err(Error::StateContract(_))));
        assert!(matches!(state.retrieved(), Err(Error::StateContract(_))));
        assert!(matches!(state.answer(), Err(Error::StateContract(_))));
    }

    #[test]
    fn test_slots_are_write_once() {
        let mut state = PipelineState::new("/tmp/doc.pdf", "what?");
        state.set_pages(vec![PageText::new(1, "hello")]).unwrap();

        let second = state.set_pages(vec![PageText::new(1, "other")]);
        assert!(matches!(second, Err(Error::StateContract(_))));
        assert_eq!(state.pages().unwrap()[0].text, "hello");
    }

    #[test]
    fn test_outcome_requires_answer() {
        let mut state = PipelineState::new("/tmp/doc.pdf", "what?");
        state.set_retrieved(Vec::new()).unwrap();
        assert!(matches!(state.into_outcome(), Err(Error::StateContract(_))));

        let mut state = PipelineState::new("/tmp/doc.pdf", "what?");
        state.set_retrieved(Vec::new()).unwrap();
        state.set_answer("42".to_string()).unwrap();
        let outcome = state.into_outcome().unwrap();
        assert_eq!(outcome.answer, "42");
        assert!(outcome.retrieved.is_empty());
    }
}
