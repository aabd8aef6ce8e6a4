//! docqa-rag: Ask questions about a single uploaded document
//!
//! Every request runs a fixed five-stage pipeline over its own document:
//! load pages, split them into overlapping chunks, embed the chunks into a
//! request-scoped index, retrieve the chunks closest to the question, and ask
//! a language model to answer from them.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::{PipelineOutcome, PipelineState, RagPipeline};
pub use types::{
    document::{Chunk, PageText, RetrievedChunk},
    response::{InvokeResponse, RetrievedDoc},
};
