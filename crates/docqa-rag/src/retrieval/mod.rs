//! Per-request indexing and similarity retrieval

mod builder;
mod index;
mod retriever;

pub use builder::IndexBuilder;
pub use index::{FlatIndex, VectorIndex};
pub use retriever::Retriever;
