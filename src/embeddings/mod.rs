// Embeddings module
// Provider traits for the inference services plus the Ollama client

pub mod ollama;

use crate::Result;

/// Capability interface for turning text into fixed-length vectors.
///
/// The pipeline is generic over this trait so it can be exercised in tests
/// without a running inference service.
pub trait EmbeddingProvider {
    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, preserving input order
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Capability interface for text generation from an assembled prompt
pub trait GenerationProvider {
    /// Generate a completion for the prompt
    fn complete(&self, prompt: &str) -> Result<String>;
}

pub use ollama::{EmbeddingResult, OllamaClient};
