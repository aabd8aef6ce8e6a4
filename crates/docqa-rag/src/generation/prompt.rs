//! Prompt templates for grounded answers

use crate::types::RetrievedChunk;

/// Placeholder used when retrieval returned nothing
pub const NO_CONTEXT: &str = "(no relevant passages were found in the document)";

/// Prompt builder for document questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Render retrieved chunks as numbered, page-tagged passages
    pub fn build_context(retrieved: &[RetrievedChunk]) -> String {
        if retrieved.is_empty() {
            return NO_CONTEXT.to_string();
        }

        let mut context = String::new();
        for (i, hit) in retrieved.iter().enumerate() {
            context.push_str(&format!(
                "[{}] Page {}\n\nContent:\n{}\n\n---\n\n",
                i + 1,
                hit.chunk.page_number,
                hit.chunk.content
            ));
        }
        context
    }

    /// Build the full prompt for a question over the given chunks
    pub fn build_prompt(question: &str, retrieved: &[RetrievedChunk]) -> String {
        format!(
            r#"You are an assistant that answers questions about a single uploaded document.

RULES:
1. Use ONLY the information in the CONTEXT below
2. If the answer is not in the context, say that the document does not contain it
3. Do not use outside knowledge or guess beyond what the context states
4. Mention the page number when you rely on a passage, e.g. (Page 3)

CONTEXT FROM THE DOCUMENT:
{context}

QUESTION: {question}

Answer:"#,
            context = Self::build_context(retrieved).trim_end(),
            question = question.trim()
        )
    }
}
