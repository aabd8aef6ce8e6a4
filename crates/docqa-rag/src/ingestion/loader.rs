//! Document loading stage

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::pipeline::{PipelineState, Stage};

use super::parser::DocumentParser;

/// Reads the uploaded document into page texts
pub struct DocumentLoader {
    parser: Arc<dyn DocumentParser>,
}

impl DocumentLoader {
    pub fn new(parser: Arc<dyn DocumentParser>) -> Self {
        Self { parser }
    }
}

#[async_trait]
impl Stage for DocumentLoader {
    fn name(&self) -> &'static str {
        "ingest_document"
    }

    async fn run(&self, state: &mut PipelineState) -> Result<()> {
        let path = state.source_path().to_path_buf();
        let label = path.display().to_string();
        let parser = Arc::clone(&self.parser);

        // PDF extraction is CPU-bound; a parser panic means the document is unreadable
        let pages = tokio::task::spawn_blocking(move || parser.parse(&path))
            .await
            .map_err(|e| Error::load(&label, format!("document parser failed: {}", e)))??;

        tracing::info!(
            "Loaded {} pages from {} using {} parser",
            pages.len(),
            state.source_path().display(),
            self.parser.name()
        );

        state.set_pages(pages)
    }
}
