#[cfg(test)]
mod tests;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{RaglineError, Result};

/// Placeholder substituted with the rendered context block
pub const CONTEXT_PLACEHOLDER: &str = "{context}";
/// Placeholder substituted with the user's question
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// Default instruction template for answering from retrieved context
pub const DEFAULT_TEMPLATE: &str = "\
You are a helpful assistant that answers questions using only the provided context.
If the context does not contain enough information to answer, say you do not know
instead of guessing.

Context:
{context}

Question: {question}

Answer:";

/// A retrieved chunk ready to be rendered into a prompt
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedItem {
    /// Chunk identifier
    pub id: String,
    /// The chunk text
    pub content: String,
    /// Id of the document the chunk came from, if known
    pub source_document_id: Option<String>,
    /// Similarity score assigned by the search, if any
    pub similarity_score: Option<f32>,
}

/// Instruction template the generation prompt is assembled from.
///
/// The instruction text is configuration, not logic: callers can swap the
/// instruction style without touching the assembler, as long as the template
/// keeps both placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplate {
    pub instruction: String,
}

impl Default for PromptTemplate {
    #[inline]
    fn default() -> Self {
        Self {
            instruction: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Ensure both placeholders survive any user customization
    #[inline]
    pub fn validate(&self) -> Result<()> {
        for placeholder in [CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            if !self.instruction.contains(placeholder) {
                return Err(RaglineError::InvalidArgument(format!(
                    "prompt template is missing the {} placeholder",
                    placeholder
                )));
            }
        }
        Ok(())
    }
}

/// Render retrieved items into the context block of a prompt.
///
/// Each item becomes a `[Document N]` block carrying its content and source,
/// blocks separated by a blank line. Items with no source document render
/// `unknown`. An empty input renders an empty string.
#[inline]
pub fn format_context(items: &[RetrievedItem]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            format!(
                "[Document {}]\n{}\n[Source: {}]",
                position + 1,
                item.content,
                item.source_document_id.as_deref().unwrap_or("unknown")
            )
        })
        .join("\n\n")
}

/// Substitute the rendered context and the user's question into the template,
/// producing the final prompt for the generation service.
#[inline]
pub fn build_prompt(query: &str, context: &str, template: &PromptTemplate) -> String {
    template
        .instruction
        .replace(CONTEXT_PLACEHOLDER, context)
        .replace(QUESTION_PLACEHOLDER, query)
}
