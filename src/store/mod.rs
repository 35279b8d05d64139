// Vector store module
// Handles persistence and similarity search for chunk embeddings

pub mod vector_store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::prompt::RetrievedItem;

pub use vector_store::VectorStore;

/// An embedded chunk ready to be persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    /// Unique identifier for this record
    pub id: String,
    /// The vector embedding
    pub vector: Vec<f32>,
    /// Metadata stored alongside the vector
    pub metadata: ChunkRecord,
}

/// Metadata for a chunk stored alongside its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Derived chunk id (`<document_id>_<chunk_index>`)
    pub chunk_id: String,
    /// Id of the document the chunk came from
    pub document_id: String,
    /// Display label of the source document
    pub source_label: String,
    /// The chunk text
    pub content: String,
    /// Position of the chunk within its document
    pub chunk_index: u32,
    /// Timestamp when this record was created
    pub created_at: String,
}

/// A ranked result from similarity search
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub record: ChunkRecord,
    pub similarity_score: f32,
    pub distance: f32,
}

impl From<&SearchResult> for RetrievedItem {
    #[inline]
    fn from(result: &SearchResult) -> Self {
        Self {
            id: result.record.chunk_id.clone(),
            content: result.record.content.clone(),
            source_document_id: Some(result.record.document_id.clone()),
            similarity_score: Some(result.similarity_score),
        }
    }
}

/// Capability interface over the vector database.
///
/// The pipeline depends on this trait rather than on LanceDB directly so the
/// retrieval path stays swappable and testable.
#[async_trait]
pub trait VectorIndex {
    /// Persist a batch of embedded chunks
    async fn upsert(&mut self, records: Vec<EmbeddedChunk>) -> Result<()>;

    /// Return the `limit` nearest records to the query vector, ranked by
    /// similarity
    async fn search(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Total number of stored records
    async fn count(&self) -> Result<u64>;

    /// Remove all records belonging to a document
    async fn delete_document(&mut self, document_id: &str) -> Result<()>;
}
