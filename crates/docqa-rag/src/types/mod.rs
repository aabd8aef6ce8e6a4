//! Core types for the pipeline

pub mod document;
pub mod response;

pub use document::{Chunk, PageText, RetrievedChunk};
pub use response::{InvokeResponse, RetrievedDoc};
