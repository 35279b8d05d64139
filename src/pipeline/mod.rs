
use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chunking::{Document, chunk_documents, clean_text};
use crate::config::Config;
use crate::embeddings::ollama::OllamaClient;
use crate::embeddings::{EmbeddingProvider, GenerationProvider};
use crate::prompt::{RetrievedItem, build_prompt, format_context};
use crate::store::{ChunkRecord, EmbeddedChunk, SearchResult, VectorIndex, VectorStore};
use crate::{RaglineError, Result};

/// The linear RAG flow: clean → chunk → embed → store on ingest, and
/// embed → search → assemble → generate on query.
///
/// Generic over the provider traits so the flow can be exercised without a
/// running inference service or a real vector database.
pub struct RagPipeline<E, G, S> {
    embedder: E,
    generator: G,
    index: S,
    config: Config,
}

/// Statistics about an ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub documents_processed: usize,
    pub chunks_created: usize,
    pub embeddings_stored: usize,
}

/// A generated answer along with the retrieval it was grounded on
#[derive(Debug, Clone)]
pub struct RagAnswer {
    /// Text returned by the generation model
    pub answer: String,
    /// The assembled prompt that was submitted
    pub prompt: String,
    /// Ranked chunks the context was built from
    pub sources: Vec<SearchResult>,
}

impl RagPipeline<OllamaClient, OllamaClient, VectorStore> {
    /// Build the production pipeline: Ollama for inference, LanceDB for
    /// storage.
    #[inline]
    pub async fn with_ollama(config: Config) -> Result<Self> {
        let client = OllamaClient::new(&config.ollama)
            .map_err(|e| RaglineError::Config(format!("{:#}", e)))?;
        let index = VectorStore::new(&config).await?;

        Ok(Self::new(config, client.clone(), client, index))
    }
}

impl<E, G, S> RagPipeline<E, G, S>
where
    E: EmbeddingProvider,
    G: GenerationProvider,
    S: VectorIndex,
{
    #[inline]
    pub fn new(config: Config, embedder: E, generator: G, index: S) -> Self {
        Self {
            embedder,
            generator,
            index,
            config,
        }
    }

    /// Chunk, embed, and store the given documents.
    ///
    /// Embedding requests run in sequential batches of the configured size;
    /// an optional delay between batches throttles load on the inference
    /// server.
    #[inline]
    pub async fn ingest(&mut self, documents: &[Document]) -> Result<IngestStats> {
        let cleaned: Vec<Document> = documents
            .iter()
            .map(|document| Document {
                id: document.id.clone(),
                content: clean_text(&document.content),
                source_label: Some(document.source_label().to_string()),
            })
            .collect();

        let chunks = chunk_documents(&cleaned, &self.config.chunking)?;
        info!(
            "Chunked {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );

        let mut stats = IngestStats {
            documents_processed: documents.len(),
            chunks_created: chunks.len(),
            embeddings_stored: 0,
        };

        if chunks.is_empty() {
            return Ok(stats);
        }

        let batch_size = self.config.ollama.batch_size.max(1) as usize;
        let batch_delay = Duration::from_millis(self.config.ollama.batch_delay_ms);
        let batch_count = chunks.len().div_ceil(batch_size);
        let created_at = Utc::now().to_rfc3339();
        let labels: HashMap<&str, &str> = cleaned
            .iter()
            .map(|d| (d.id.as_str(), d.source_label()))
            .collect();

        for (batch_index, batch) in chunks.chunks(batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts)?;

            if vectors.len() != batch.len() {
                return Err(RaglineError::Embedding(format!(
                    "Mismatch between chunk and embedding counts: {} vs {}",
                    batch.len(),
                    vectors.len()
                )));
            }

            let records: Vec<EmbeddedChunk> = batch
                .iter()
                .zip(vectors)
                .map(|(chunk, vector)| {
                    let source_label = labels
                        .get(chunk.source_document_id.as_str())
                        .copied()
                        .unwrap_or(chunk.source_document_id.as_str())
                        .to_string();

                    EmbeddedChunk {
                        id: Uuid::new_v4().to_string(),
                        vector,
                        metadata: ChunkRecord {
                            chunk_id: chunk.id.clone(),
                            document_id: chunk.source_document_id.clone(),
                            source_label,
                            content: chunk.content.clone(),
                            chunk_index: chunk.chunk_index as u32,
                            created_at: created_at.clone(),
                        },
                    }
                })
                .collect();

            stats.embeddings_stored += records.len();
            self.index.upsert(records).await?;

            debug!(
                "Stored batch {}/{} ({} chunks)",
                batch_index + 1,
                batch_count,
                batch.len()
            );

            if !batch_delay.is_zero() && batch_index + 1 < batch_count {
                sleep(batch_delay).await;
            }
        }

        info!(
            "Ingested {} chunks from {} documents",
            stats.embeddings_stored, stats.documents_processed
        );
        Ok(stats)
    }

    /// Embed the query and return the nearest stored chunks
    #[inline]
    pub async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        debug!("Retrieving up to {} chunks for query", limit);

        let query_vector = self.embedder.embed(query)?;
        self.index.search(&query_vector, limit).await
    }

    /// Answer a question from the indexed documents.
    ///
    /// An empty retrieval still assembles a prompt with an empty context
    /// section; the instruction template tells the model to admit ignorance
    /// rather than guess.
    #[inline]
    pub async fn answer(&self, query: &str, limit: usize) -> Result<RagAnswer> {
        let sources = self.retrieve(query, limit).await?;

        let items: Vec<RetrievedItem> = sources.iter().map(RetrievedItem::from).collect();
        let context = format_context(&items);
        let prompt = build_prompt(query, &context, &self.config.prompt);

        debug!(
            "Assembled prompt with {} context blocks ({} chars)",
            items.len(),
            prompt.len()
        );

        let answer = self.generator.complete(&prompt)?;

        Ok(RagAnswer {
            answer,
            prompt,
            sources,
        })
    }

    /// Total number of stored chunks
    #[inline]
    pub async fn stored_chunks(&self) -> Result<u64> {
        self.index.count().await
    }

    /// Remove a document's chunks from the index
    #[inline]
    pub async fn forget_document(&mut self, document_id: &str) -> Result<()> {
        self.index.delete_document(document_id).await
    }
}
