//! LanceDB vector store for regulatory knowledge chunks.
//!
//! Stores and searches chunk embeddings locally using LanceDB. Writes are
//! upserts keyed on chunk id, so re-ingesting a source replaces stale rows
//! instead of duplicating them.

use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, Int64Array, RecordBatch, RecordBatchIterator,
    StringArray, types::Float32Type,
};
use arrow_schema::{DataType, Field, Schema};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};

use exportready_core::types::CertificationType;

use crate::error::RagError;
use crate::types::{ChunkFilters, KnowledgeChunk, ScoredChunk};

const TABLE_NAME: &str = "regulatory_chunks";

/// LanceDB-backed vector store for regulatory chunk embeddings.
pub struct ChunkStore {
    db: lancedb::Connection,
    dims: usize,
}

impl ChunkStore {
    /// Open or create a chunk store at the given path.
    pub async fn open(path: &str, dims: usize) -> Result<Self, RagError> {
        let db = lancedb::connect(path).execute().await?;
        let store = Self { db, dims };
        store.ensure_table().await?;
        Ok(store)
    }

    /// Build the Arrow schema for the chunks table.
    fn schema(&self) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("text", DataType::Utf8, false),
            Field::new("regulation", DataType::Utf8, true),
            Field::new("country", DataType::Utf8, true),
            Field::new("certification_type", DataType::Utf8, true),
            Field::new("ingested_at", DataType::Int64, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    self.dims as i32,
                ),
                false,
            ),
        ]))
    }

    /// Ensure the chunks table exists.
    async fn ensure_table(&self) -> Result<(), RagError> {
        let tables = self.db.table_names().execute().await?;
        if !tables.contains(&TABLE_NAME.to_string()) {
            let schema = self.schema();
            let empty_batch = RecordBatch::new_empty(schema.clone());
            let batches = RecordBatchIterator::new(vec![Ok(empty_batch)], schema);
            self.db.create_table(TABLE_NAME, batches).execute().await?;
        }
        Ok(())
    }

    /// Upsert chunks with pre-computed embeddings.
    ///
    /// Rows whose ids already exist are deleted first, so the newest text
    /// and vector always win.
    pub async fn upsert_chunks(
        &self,
        chunks: &[KnowledgeChunk],
        embeddings: Vec<Vec<f32>>,
    ) -> Result<usize, RagError> {
        if chunks.is_empty() || embeddings.is_empty() {
            return Ok(0);
        }

        if chunks.len() != embeddings.len() {
            return Err(RagError::Embedding(format!(
                "Mismatch: {} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let schema = self.schema();
        let n = chunks.len();

        let table = self.db.open_table(TABLE_NAME).execute().await?;

        let id_list = chunks
            .iter()
            .map(|c| format!("'{}'", escape_sql(&c.id)))
            .collect::<Vec<_>>()
            .join(", ");
        table.delete(&format!("id IN ({id_list})")).await?;

        // Build Arrow arrays from chunks
        let ids = StringArray::from_iter_values(chunks.iter().map(|c| c.id.as_str()));
        let sources = StringArray::from_iter_values(chunks.iter().map(|c| c.source.as_str()));
        let texts = StringArray::from_iter_values(chunks.iter().map(|c| c.text.as_str()));
        let regulations =
            StringArray::from(chunks.iter().map(|c| c.regulation.as_deref()).collect::<Vec<_>>());
        let countries =
            StringArray::from(chunks.iter().map(|c| c.country.as_deref()).collect::<Vec<_>>());
        let cert_types = StringArray::from(
            chunks
                .iter()
                .map(|c| c.certification_type.as_ref().map(|t| t.as_str()))
                .collect::<Vec<_>>(),
        );
        let ingested =
            Int64Array::from(chunks.iter().map(|c| c.ingested_at).collect::<Vec<_>>());

        // Build the vector column
        let vector_array = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
            embeddings
                .into_iter()
                .map(|v| Some(v.into_iter().map(Some).collect::<Vec<_>>())),
            self.dims as i32,
        );

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(ids),
                Arc::new(sources),
                Arc::new(texts),
                Arc::new(regulations),
                Arc::new(countries),
                Arc::new(cert_types),
                Arc::new(ingested),
                Arc::new(vector_array) as Arc<dyn Array>,
            ],
        )
        .map_err(|e| RagError::Store(format!("Failed to create record batch: {e}")))?;

        let batches = RecordBatchIterator::new(vec![Ok(batch)], schema);
        table.add(batches).execute().await?;

        Ok(n)
    }

    /// Search for chunks similar to a query embedding.
    ///
    /// A country filter also admits country-agnostic rows, so guidance that
    /// applies everywhere is never filtered out of a market-specific search.
    pub async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        filters: &ChunkFilters,
    ) -> Result<Vec<ScoredChunk>, RagError> {
        let table = self.db.open_table(TABLE_NAME).execute().await?;

        let mut query = table
            .vector_search(query_embedding)
            .map_err(|e| RagError::Store(format!("Failed to build search query: {e}")))?;

        query = query.limit(limit);

        if let Some(sql) = filter_sql(filters) {
            query = query.only_if(sql);
        }

        let results: Vec<RecordBatch> = query
            .execute()
            .await?
            .try_collect()
            .await
            .map_err(|e| RagError::Store(format!("Failed to execute search: {e}")))?;

        let mut scored_chunks = Vec::new();
        for batch in &results {
            let n = batch.num_rows();
            let ids = batch
                .column_by_name("id")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>());
            let sources = batch
                .column_by_name("source")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>());
            let texts = batch
                .column_by_name("text")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>());
            let regulations = batch
                .column_by_name("regulation")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>());
            let countries = batch
                .column_by_name("country")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>());
            let cert_types = batch
                .column_by_name("certification_type")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>());
            let ingested = batch
                .column_by_name("ingested_at")
                .and_then(|c| c.as_any().downcast_ref::<Int64Array>());
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>());

            // All required columns must be present
            let (Some(ids), Some(sources), Some(texts)) = (ids, sources, texts) else {
                continue;
            };

            for i in 0..n {
                let distance = distances.map(|d| d.value(i)).unwrap_or(0.0);
                let similarity = 1.0 / (1.0 + distance);

                scored_chunks.push(ScoredChunk {
                    chunk: KnowledgeChunk {
                        id: ids.value(i).to_string(),
                        source: sources.value(i).to_string(),
                        text: texts.value(i).to_string(),
                        regulation: regulations.and_then(|col| string_at(col, i)),
                        country: countries.and_then(|col| string_at(col, i)),
                        certification_type: cert_types
                            .and_then(|col| string_at(col, i))
                            .map(|s| CertificationType::parse(&s)),
                        ingested_at: ingested.map(|col| col.value(i)).unwrap_or(0),
                    },
                    similarity,
                });
            }
        }

        Ok(scored_chunks)
    }

    /// Delete all chunks from a source.
    pub async fn delete_source(&self, source: &str) -> Result<(), RagError> {
        let table = self.db.open_table(TABLE_NAME).execute().await?;
        table
            .delete(&format!("source = '{}'", escape_sql(source)))
            .await?;
        Ok(())
    }

    /// Get the number of indexed chunks.
    pub async fn count(&self) -> Result<usize, RagError> {
        let table = self.db.open_table(TABLE_NAME).execute().await?;
        let count = table.count_rows(None).await?;
        Ok(count)
    }
}

fn string_at(col: &StringArray, i: usize) -> Option<String> {
    if col.is_null(i) {
        None
    } else {
        Some(col.value(i).to_string())
    }
}

fn escape_sql(value: &str) -> String {
    value.replace('\'', "''")
}

fn filter_sql(filters: &ChunkFilters) -> Option<String> {
    let mut clauses = Vec::new();
    if let Some(country) = &filters.country {
        clauses.push(format!(
            "(country = '{}' OR country IS NULL)",
            escape_sql(country)
        ));
    }
    if let Some(cert) = &filters.certification_type {
        clauses.push(format!(
            "certification_type = '{}'",
            escape_sql(cert.as_str())
        ));
    }
    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" AND "))
    }
}
