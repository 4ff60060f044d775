
use super::{PartMetadata, PartRecord};
use crate::database::PartStore;
use crate::{PartsError, config::Config};
use arrow::array::{Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::{
    Connection, Table,
    query::{ExecutableQuery, QueryBase},
    table::AddDataMode,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const TABLE_NAME: &str = "parts";

/// Part records and their embeddings, backed by LanceDB
pub struct VectorStore {
    connection: Connection,
    table_name: String,
    default_dimension: usize,
}

/// Search result from vector similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub metadata: PartMetadata,
    pub distance: f32,
}

impl VectorStore {
    /// Open (or create) the store under `config.vector_database_path()`
    #[inline]
    pub async fn new(config: &Config) -> Result<Self, PartsError> {
        let db_path = config.vector_database_path();
        debug!("Initializing LanceDB at path: {:?}", db_path);

        std::fs::create_dir_all(&db_path).map_err(|e| {
            PartsError::Database(format!("Failed to create vector database directory: {}", e))
        })?;

        let uri = format!("file://{}", db_path.display());

        let connection = match lancedb::connect(&uri).execute().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Failed to connect to LanceDB: {}", e);

                let error_msg = e.to_string().to_lowercase();
                if error_msg.contains("corrupt")
                    || error_msg.contains("invalid")
                    || error_msg.contains("malformed")
                {
                    warn!("Database corruption detected, attempting recovery");
                    Self::attempt_corruption_recovery(&db_path)?;

                    lancedb::connect(&uri).execute().await.map_err(|e| {
                        PartsError::Database(format!(
                            "Failed to connect to LanceDB after recovery: {}",
                            e
                        ))
                    })?
                } else {
                    return Err(PartsError::Database(format!(
                        "Failed to connect to LanceDB: {}",
                        e
                    )));
                }
            }
        };

        let store = Self {
            connection,
            table_name: TABLE_NAME.to_string(),
            default_dimension: config.ollama.embedding_dimension as usize,
        };

        store.initialize_table().await?;

        info!("Vector store initialized successfully");
        Ok(store)
    }

    /// Create the parts table if it does not exist yet
    async fn initialize_table(&self) -> Result<(), PartsError> {
        if self.table_exists().await? {
            debug!("Parts table already exists");
            return Ok(());
        }

        info!(
            "Creating parts table with {} dimensions",
            self.default_dimension
        );
        self.create_empty_table(self.default_dimension).await
    }

    async fn table_exists(&self) -> Result<bool, PartsError> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| PartsError::Database(format!("Failed to list tables: {}", e)))?;

        Ok(table_names.contains(&self.table_name))
    }

    async fn create_empty_table(&self, vector_dim: usize) -> Result<(), PartsError> {
        self.connection
            .create_empty_table(&self.table_name, Self::create_schema(vector_dim))
            .execute()
            .await
            .map_err(|e| PartsError::Database(format!("Failed to create table: {}", e)))?;
        Ok(())
    }

    async fn open_table(&self) -> Result<Table, PartsError> {
        self.connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| PartsError::Database(format!("Failed to open table: {}", e)))
    }

    /// Create schema with the specified vector dimension
    fn create_schema(vector_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("part_number", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    vector_dim as i32,
                ),
                false,
            ),
            Field::new("category", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            Field::new("description", DataType::Utf8, false),
            Field::new("url", DataType::Utf8, false),
            Field::new("indexed_at", DataType::Utf8, false),
        ]))
    }

    /// Create a RecordBatch from part records that all share `vector_dim`
    fn create_record_batch(
        records: &[PartRecord],
        vector_dim: usize,
    ) -> Result<RecordBatch, PartsError> {
        let len = records.len();

        let mut part_numbers = Vec::with_capacity(len);
        let mut categories = Vec::with_capacity(len);
        let mut titles = Vec::with_capacity(len);
        let mut descriptions = Vec::with_capacity(len);
        let mut urls = Vec::with_capacity(len);
        let mut indexed_ats = Vec::with_capacity(len);
        let mut flat_values = Vec::with_capacity(len * vector_dim);

        for record in records {
            if record.vector.len() != vector_dim {
                return Err(PartsError::Database(format!(
                    "Part {} has a {}-dimensional vector, expected {}",
                    record.part_number(),
                    record.vector.len(),
                    vector_dim
                )));
            }

            part_numbers.push(record.metadata.part_number.as_str());
            categories.push(record.metadata.category.as_str());
            titles.push(record.metadata.title.as_str());
            descriptions.push(record.metadata.description.as_str());
            urls.push(record.metadata.url.as_str());
            indexed_ats.push(record.metadata.indexed_at.as_str());
            flat_values.extend_from_slice(&record.vector);
        }

        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array =
            FixedSizeListArray::try_new(field, vector_dim as i32, Arc::new(values_array), None)
                .map_err(|e| {
                    PartsError::Database(format!("Failed to create vector array: {}", e))
                })?;

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(part_numbers)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(categories)),
            Arc::new(StringArray::from(titles)),
            Arc::new(StringArray::from(descriptions)),
            Arc::new(StringArray::from(urls)),
            Arc::new(StringArray::from(indexed_ats)),
        ];

        RecordBatch::try_new(Self::create_schema(vector_dim), arrays)
            .map_err(|e| PartsError::Database(format!("Failed to create record batch: {}", e)))
    }

    /// Replace the whole collection with `records`
    ///
    /// When the incoming vectors match the stored dimension the rows are
    /// overwritten in one commit, so readers see either the old or the new
    /// collection. A dimension change drops and recreates the table.
    #[inline]
    pub async fn replace_records(&self, records: Vec<PartRecord>) -> Result<(), PartsError> {
        let Some(first) = records.first() else {
            debug!("No records supplied, clearing collection");
            return self.clear_records().await;
        };

        let vector_dim = first.vector.len();
        if vector_dim != self.default_dimension {
            warn!(
                "Embedding dimension {} differs from configured dimension {}",
                vector_dim, self.default_dimension
            );
        }

        let record_batch = Self::create_record_batch(&records, vector_dim)?;
        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);

        let mode = match self.stored_dimension().await? {
            Some(stored) if stored == vector_dim => AddDataMode::Overwrite,
            stored => {
                info!(
                    "Recreating parts table: stored dimension {:?}, incoming {}",
                    stored, vector_dim
                );
                self.drop_table_if_exists().await?;
                self.create_empty_table(vector_dim).await?;
                AddDataMode::Append
            }
        };

        let table = self.open_table().await?;
        table
            .add(reader)
            .mode(mode)
            .execute()
            .await
            .map_err(|e| PartsError::Database(format!("Failed to insert parts: {}", e)))?;

        info!("Stored {} part records", records.len());
        Ok(())
    }

    /// Vector width of the existing table, `None` when there is no table
    async fn stored_dimension(&self) -> Result<Option<usize>, PartsError> {
        if !self.table_exists().await? {
            return Ok(None);
        }

        let schema = self
            .open_table()
            .await?
            .schema()
            .await
            .map_err(|e| PartsError::Database(format!("Failed to read table schema: {}", e)))?;

        Ok(match schema.field_with_name("vector").map(Field::data_type) {
            Ok(DataType::FixedSizeList(_, size)) => usize::try_from(*size).ok(),
            _ => None,
        })
    }

    /// Remove every record, leaving an empty table behind
    #[inline]
    pub async fn clear_records(&self) -> Result<(), PartsError> {
        self.drop_table_if_exists().await?;
        self.create_empty_table(self.default_dimension).await?;
        info!("Cleared parts collection");
        Ok(())
    }

    /// Exact lookup by part number
    #[inline]
    pub async fn get_by_part_number(
        &self,
        part_number: &str,
    ) -> Result<Option<PartMetadata>, PartsError> {
        debug!("Looking up part number {}", part_number);

        let table = self.open_table().await?;
        let results = table
            .query()
            .only_if(format!(
                "part_number = '{}'",
                part_number.replace('\'', "''")
            ))
            .limit(1)
            .execute()
            .await
            .map_err(|e| PartsError::Database(format!("Failed to execute lookup: {}", e)))?;

        let mut matches = Self::parse_results_stream(results).await?;
        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.swap_remove(0).metadata)
        })
    }

    /// Search for similar parts using vector similarity
    ///
    /// # Arguments
    /// * `query_vector` - The query vector to search for
    /// * `limit` - Maximum number of results to return
    ///
    /// # Returns
    /// * `Result<Vec<SearchResult>, PartsError>` - Results ordered by ascending distance
    #[inline]
    pub async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, PartsError> {
        debug!("Searching for similar vectors with limit: {}", limit);

        let table = self.open_table().await?;
        let results = table
            .vector_search(query_vector)
            .map_err(|e| PartsError::Database(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .limit(limit)
            .execute()
            .await
            .map_err(|e| PartsError::Database(format!("Failed to execute search: {}", e)))?;

        let mut search_results = Self::parse_results_stream(results).await?;
        search_results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        search_results.truncate(limit);
        Ok(search_results)
    }

    /// Get the total number of part records stored
    #[inline]
    pub async fn count_records(&self) -> Result<u64, PartsError> {
        let table = self.open_table().await?;

        let count = table
            .count_rows(None)
            .await
            .map_err(|e| PartsError::Database(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    async fn parse_results_stream(
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<SearchResult>, PartsError> {
        let mut search_results = Vec::new();

        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| PartsError::Database(format!("Failed to read result stream: {}", e)))?
        {
            search_results.extend(Self::parse_batch(&batch)?);
        }

        debug!("Parsed {} results from stream", search_results.len());
        Ok(search_results)
    }

    fn parse_batch(batch: &RecordBatch) -> Result<Vec<SearchResult>, PartsError> {
        let part_numbers = string_column(batch, "part_number")?;
        let categories = string_column(batch, "category")?;
        let titles = string_column(batch, "title")?;
        let descriptions = string_column(batch, "description")?;
        let urls = string_column(batch, "url")?;
        let indexed_ats = string_column(batch, "indexed_at")?;

        // Only present on vector searches
        let distances = batch
            .column_by_name("_distance")
            .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

        let results = (0..batch.num_rows())
            .map(|row| {
                let distance =
                    distances.map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

                SearchResult {
                    metadata: PartMetadata {
                        part_number: part_numbers.value(row).to_string(),
                        category: categories.value(row).to_string(),
                        title: titles.value(row).to_string(),
                        description: descriptions.value(row).to_string(),
                        url: urls.value(row).to_string(),
                        indexed_at: indexed_ats.value(row).to_string(),
                    },
                    distance,
                }
            })
            .collect();

        Ok(results)
    }

    /// Attempt to recover from database corruption
    fn attempt_corruption_recovery(db_path: &Path) -> Result<(), PartsError> {
        warn!("Attempting database corruption recovery at {:?}", db_path);

        if db_path.exists() {
            let backup_path = db_path.with_extension("corrupted_backup");
            if let Err(e) = std::fs::rename(db_path, &backup_path) {
                error!("Failed to backup corrupted database: {}", e);
            } else {
                info!("Corrupted database backed up to {:?}", backup_path);
            }
        }

        if db_path.exists() {
            std::fs::remove_dir_all(db_path).map_err(|e| {
                PartsError::Database(format!("Failed to remove corrupted database: {}", e))
            })?;
        }

        info!("Database corruption recovery completed");
        Ok(())
    }

    async fn drop_table_if_exists(&self) -> Result<(), PartsError> {
        if self.table_exists().await? {
            info!("Dropping existing parts table");
            self.connection
                .drop_table(&self.table_name)
                .await
                .map_err(|e| PartsError::Database(format!("Failed to drop table: {}", e)))?;
        }

        Ok(())
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, PartsError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| PartsError::Database(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| PartsError::Database(format!("Invalid {} column type", name)))
}

#[async_trait]
impl PartStore for VectorStore {
    async fn find_by_part_number(
        &self,
        part_number: &str,
    ) -> crate::Result<Option<PartMetadata>> {
        self.get_by_part_number(part_number).await
    }

    async fn search_similar(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> crate::Result<Vec<SearchResult>> {
        self.search(query_vector, limit).await
    }

    async fn replace_all(&self, records: Vec<PartRecord>) -> crate::Result<()> {
        self.replace_records(records).await
    }

    async fn clear(&self) -> crate::Result<()> {
        self.clear_records().await
    }

    async fn count(&self) -> crate::Result<u64> {
        self.count_records().await
    }
}
