
use super::{ChunkRecord, EmbeddedChunk, SearchResult, VectorIndex};
use crate::{RaglineError, config::Config};
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

const TABLE_NAME: &str = "chunks";

/// Vector database store using LanceDB for similarity search
pub struct VectorStore {
    connection: Connection,
    table_name: String,
    vector_dimension: Option<usize>,
}

impl VectorStore {
    /// Open (or create) the vector database under the configured base
    /// directory.
    #[inline]
    pub async fn new(config: &Config) -> Result<Self, RaglineError> {
        let db_path = config.vector_database_path();
        debug!("Initializing LanceDB at path: {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RaglineError::Store(format!("Failed to create vector database directory: {}", e))
            })?;
        }

        let uri = format!("file://{}", db_path.display());

        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to connect to LanceDB: {}", e)))?;

        let mut store = Self {
            connection,
            table_name: TABLE_NAME.to_string(),
            vector_dimension: None,
        };

        store
            .initialize_table(config.ollama.embedding_dimension as usize)
            .await?;

        info!("Vector store initialized successfully");
        Ok(store)
    }

    /// Create the chunks table if needed, otherwise detect the stored vector
    /// dimension from the existing schema.
    async fn initialize_table(&mut self, default_dimension: usize) -> Result<(), RaglineError> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to list tables: {}", e)))?;

        if table_names.contains(&self.table_name) {
            match self.detect_existing_vector_dimension().await {
                Ok(dim) => {
                    debug!("Detected existing vector dimension: {}", dim);
                    self.vector_dimension = Some(dim);
                }
                Err(e) => {
                    warn!(
                        "Could not detect vector dimension from existing table: {}",
                        e
                    );
                    self.vector_dimension = Some(default_dimension);
                }
            }
            return Ok(());
        }

        info!(
            "Creating chunks table with {} dimensions (recreated on first insert if the embedding model differs)",
            default_dimension
        );

        let schema = self.create_schema(default_dimension);
        self.connection
            .create_empty_table(&self.table_name, schema)
            .execute()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to create table: {}", e)))?;

        self.vector_dimension = Some(default_dimension);
        Ok(())
    }

    /// Detect vector dimension from the existing table schema
    async fn detect_existing_vector_dimension(&self) -> Result<usize, RaglineError> {
        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to open existing table: {}", e)))?;

        let schema = table
            .schema()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to get table schema: {}", e)))?;

        for field in schema.fields() {
            if field.name() == "vector" {
                if let DataType::FixedSizeList(_, size) = field.data_type() {
                    return Ok(*size as usize);
                }
            }
        }

        Err(RaglineError::Store(
            "Could not find vector column or determine dimension".to_string(),
        ))
    }

    /// Create the Arrow schema with the specified vector dimension
    fn create_schema(&self, vector_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    vector_dim as i32,
                ),
                false,
            ),
            Field::new("chunk_id", DataType::Utf8, false),
            Field::new("document_id", DataType::Utf8, false),
            Field::new("source_label", DataType::Utf8, false),
            Field::new("content", DataType::Utf8, false),
            Field::new("chunk_index", DataType::UInt32, false),
            Field::new("created_at", DataType::Utf8, false),
        ]))
    }

    /// Recreate the table when the embedding dimension changes
    async fn recreate_table_with_dimension(&self, vector_dim: usize) -> Result<(), RaglineError> {
        info!("Recreating table with vector dimension: {}", vector_dim);

        self.drop_table_if_exists().await?;

        let schema = self.create_schema(vector_dim);
        self.connection
            .create_empty_table(&self.table_name, schema)
            .execute()
            .await
            .map_err(|e| {
                RaglineError::Store(format!("Failed to create table with new dimensions: {}", e))
            })?;

        Ok(())
    }

    /// Drop the chunks table if it exists
    async fn drop_table_if_exists(&self) -> Result<(), RaglineError> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to list tables for drop: {}", e)))?;

        if table_names.contains(&self.table_name) {
            info!("Dropping existing chunks table");
            self.connection
                .drop_table(&self.table_name)
                .await
                .map_err(|e| RaglineError::Store(format!("Failed to drop table: {}", e)))?;
        }

        Ok(())
    }

    /// Create a RecordBatch from embedded chunks
    fn create_record_batch(&self, records: &[EmbeddedChunk]) -> Result<RecordBatch, RaglineError> {
        let len = records.len();
        let vector_dim = self
            .vector_dimension
            .ok_or_else(|| RaglineError::Store("Vector dimension not set".to_string()))?;

        let mut ids = Vec::with_capacity(len);
        let mut vectors = Vec::with_capacity(len);
        let mut chunk_ids = Vec::with_capacity(len);
        let mut document_ids = Vec::with_capacity(len);
        let mut source_labels = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);
        let mut chunk_indices = Vec::with_capacity(len);
        let mut created_ats = Vec::with_capacity(len);

        for record in records {
            ids.push(record.id.as_str());
            vectors.push(record.vector.clone());
            chunk_ids.push(record.metadata.chunk_id.as_str());
            document_ids.push(record.metadata.document_id.as_str());
            source_labels.push(record.metadata.source_label.as_str());
            contents.push(record.metadata.content.as_str());
            chunk_indices.push(record.metadata.chunk_index);
            created_ats.push(record.metadata.created_at.as_str());
        }

        let schema = self.create_schema(vector_dim);

        let mut flat_values = Vec::with_capacity(len * vector_dim);
        for vector in &vectors {
            flat_values.extend_from_slice(vector);
        }
        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array =
            FixedSizeListArray::try_new(field, vector_dim as i32, Arc::new(values_array), None)
                .map_err(|e| {
                    RaglineError::Store(format!("Failed to create vector array: {}", e))
                })?;

        let arrays: Vec<Arc<dyn arrow::array::Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(chunk_ids)),
            Arc::new(StringArray::from(document_ids)),
            Arc::new(StringArray::from(source_labels)),
            Arc::new(StringArray::from(contents)),
            Arc::new(UInt32Array::from(chunk_indices)),
            Arc::new(StringArray::from(created_ats)),
        ];

        RecordBatch::try_new(schema, arrays)
            .map_err(|e| RaglineError::Store(format!("Failed to create record batch: {}", e)))
    }

    /// Parse search results from a LanceDB stream
    async fn parse_search_results_stream(
        &self,
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<SearchResult>, RaglineError> {
        let mut search_results = Vec::new();

        while let Some(batch_result) = results
            .try_next()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to read result stream: {}", e)))?
        {
            let parsed_batch = self.parse_search_batch(&batch_result)?;
            search_results.extend(parsed_batch);
        }

        debug!("Parsed {} search results from stream", search_results.len());
        Ok(search_results)
    }

    /// Parse a single record batch from search results
    fn parse_search_batch(&self, batch: &RecordBatch) -> Result<Vec<SearchResult>, RaglineError> {
        let mut search_results = Vec::new();
        let num_rows = batch.num_rows();

        let chunk_ids = string_column(batch, "chunk_id")?;
        let document_ids = string_column(batch, "document_id")?;
        let source_labels = string_column(batch, "source_label")?;
        let contents = string_column(batch, "content")?;
        let created_ats = string_column(batch, "created_at")?;

        let chunk_indices = batch
            .column_by_name("chunk_index")
            .ok_or_else(|| RaglineError::Store("Missing chunk_index column".to_string()))?
            .as_any()
            .downcast_ref::<UInt32Array>()
            .ok_or_else(|| RaglineError::Store("Invalid chunk_index column type".to_string()))?;

        // Distance scores are appended by LanceDB when present
        let distances = batch
            .column_by_name("_distance")
            .map(|col| col.as_any().downcast_ref::<Float32Array>());

        for row in 0..num_rows {
            let record = ChunkRecord {
                chunk_id: chunk_ids.value(row).to_string(),
                document_id: document_ids.value(row).to_string(),
                source_label: source_labels.value(row).to_string(),
                content: contents.value(row).to_string(),
                chunk_index: chunk_indices.value(row),
                created_at: created_ats.value(row).to_string(),
            };

            let distance = distances
                .flatten()
                .map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

            // Convert distance to similarity score (higher is better)
            let similarity_score = 1.0 - distance;

            search_results.push(SearchResult {
                record,
                similarity_score,
                distance,
            });
        }

        Ok(search_results)
    }

    /// Compact and reorganize the underlying table
    #[inline]
    pub async fn optimize(&mut self) -> Result<(), RaglineError> {
        debug!("Optimizing vector database");

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to open table: {}", e)))?;

        table
            .optimize(lancedb::table::OptimizeAction::All)
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to optimize table: {}", e)))?;

        info!("Vector database optimization completed");
        Ok(())
    }
}

fn string_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a StringArray, RaglineError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| RaglineError::Store(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| RaglineError::Store(format!("Invalid {} column type", name)))
}

#[async_trait]
impl VectorIndex for VectorStore {
    #[inline]
    async fn upsert(&mut self, records: Vec<EmbeddedChunk>) -> Result<(), RaglineError> {
        if records.is_empty() {
            debug!("No embeddings to store");
            return Ok(());
        }

        debug!("Storing batch of {} embeddings", records.len());

        // Auto-detect vector dimension from the first record and recreate the
        // table if the embedding model changed
        let vector_dim = records[0].vector.len();
        if self.vector_dimension != Some(vector_dim) {
            info!(
                "Vector dimension changed from {:?} to {}, recreating table",
                self.vector_dimension, vector_dim
            );
            self.recreate_table_with_dimension(vector_dim).await?;
            self.vector_dimension = Some(vector_dim);
        }

        let record_batch = self.create_record_batch(&records)?;

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to open table: {}", e)))?;

        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to insert embeddings: {}", e)))?;

        info!("Successfully stored {} embeddings", records.len());
        Ok(())
    }

    #[inline]
    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, RaglineError> {
        debug!("Searching for similar vectors with limit: {}", limit);

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to open table: {}", e)))?;

        let query = table
            .vector_search(query_vector)
            .map_err(|e| RaglineError::Store(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .limit(limit);

        let results = query
            .execute()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to execute search: {}", e)))?;

        self.parse_search_results_stream(results).await
    }

    #[inline]
    async fn count(&self) -> Result<u64, RaglineError> {
        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to open table: {}", e)))?;

        let count = table
            .count_rows(None)
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    #[inline]
    async fn delete_document(&mut self, document_id: &str) -> Result<(), RaglineError> {
        debug!("Deleting chunks for document: {}", document_id);

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| RaglineError::Store(format!("Failed to open table: {}", e)))?;

        let predicate = format!("document_id = '{}'", document_id.replace('\'', "''"));
        table.delete(&predicate).await.map_err(|e| {
            RaglineError::Store(format!("Failed to delete document chunks: {}", e))
        })?;

        info!("Deleted chunks for document: {}", document_id);
        Ok(())
    }
}
