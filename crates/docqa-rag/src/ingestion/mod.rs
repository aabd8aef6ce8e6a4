//! Document ingestion: parsing into pages and chunking

mod loader;
mod parser;
mod splitter;

pub use loader::DocumentLoader;
pub use parser::{DocumentKind, DocumentParser, FileParser};
pub use splitter::ChunkSplitter;
