//! LanceDB store for the clause knowledge base.
//!
//! One table (`risky_clauses`) maps a stable id to the risky source text,
//! its category, the vetted safe rewrite, and the embedding of the risky
//! text. Rebuilds are total: the existing table is dropped and recreated
//! from scratch, so a re-run fully replaces state regardless of what a
//! failed earlier attempt left behind.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, FixedSizeListBuilder, Float32Array, Float32Builder, RecordBatchIterator, StringArray,
};
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::DistanceType;
use lancedb::query::{ExecutableQuery, QueryBase};
use tracing::info;

use clauseguard_core::schema::clauses;
use clauseguard_core::{ClauseRecord, RiskCategory};

use crate::StoreError;

/// Rows per insert batch, bounding per-call memory pressure.
const INSERT_BATCH_SIZE: usize = 50;

/// Persistent vector index of known-risky clauses.
///
/// Written only by [`rebuild`](Self::rebuild); read-only for scanners.
pub struct KnowledgeBase {
    db: lancedb::Connection,
}

/// Metadata of a nearest-neighbor match, with its distance to the query.
///
/// Distance is cosine distance over the stored embeddings: non-negative,
/// smaller = more similar, in [0, 2] for unit vectors.
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub id: String,
    pub risky_text: String,
    pub category: RiskCategory,
    pub safe_rewrite: String,
    pub distance: f32,
}

impl KnowledgeBase {
    /// Connect to a LanceDB database at the given path, creating the
    /// directory if needed.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let uri = path
            .to_str()
            .ok_or_else(|| StoreError::Other("non-UTF8 database path".into()))?;
        let db = lancedb::connect(uri)
            .execute()
            .await
            .map_err(|source| StoreError::StoreUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { db })
    }

    /// Drop any existing clause table and recreate it from `records`.
    ///
    /// Every embedding must have length `dim`, and every record must carry
    /// a non-empty safe rewrite. Records are written in batches of 50.
    /// Zero records create an empty table, so subsequent queries return
    /// "no match" rather than [`StoreError::CollectionNotFound`].
    pub async fn rebuild(
        &self,
        records: &[ClauseRecord],
        dim: usize,
        model_id: &str,
    ) -> Result<(), StoreError> {
        for record in records {
            if record.embedding.len() != dim {
                return Err(StoreError::DimensionMismatch {
                    expected: dim,
                    actual: record.embedding.len(),
                });
            }
            if record.safe_rewrite.trim().is_empty() {
                return Err(StoreError::Other(format!(
                    "record {:?} has an empty safe rewrite",
                    record.id
                )));
            }
        }

        let schema = Arc::new(clauses::clause_schema(dim as i32));

        let existing = self.db.table_names().execute().await?;
        if existing.contains(&clauses::TABLE.to_string()) {
            self.db.drop_table(clauses::TABLE, &[]).await?;
        }

        if records.is_empty() {
            self.db
                .create_empty_table(clauses::TABLE, schema)
                .execute()
                .await?;
            info!(table = clauses::TABLE, rows = 0, "created empty clause index");
            return Ok(());
        }

        let batches: Vec<RecordBatch> = records
            .chunks(INSERT_BATCH_SIZE)
            .map(|chunk| build_batch(chunk, &schema, dim, model_id))
            .collect::<Result<_, _>>()?;
        let reader = RecordBatchIterator::new(batches.into_iter().map(Ok), schema);

        self.db
            .create_table(clauses::TABLE, Box::new(reader))
            .execute()
            .await?;

        info!(
            table = clauses::TABLE,
            rows = records.len(),
            model = model_id,
            "rebuilt clause index"
        );
        Ok(())
    }

    /// Return the `k` nearest records to `vector` by cosine distance,
    /// ordered ascending.
    ///
    /// Fails with [`StoreError::CollectionNotFound`] if no rebuild ever
    /// ran, [`StoreError::DimensionMismatch`] if the query vector's length
    /// differs from the stored embedding width, and
    /// [`StoreError::ModelMismatch`] if the index was built under a
    /// different embedding model. An empty index returns an empty vec.
    pub async fn query_nearest(
        &self,
        vector: &[f32],
        k: usize,
        model_id: &str,
    ) -> Result<Vec<Neighbor>, StoreError> {
        let table = self.db.open_table(clauses::TABLE).execute().await?;

        let schema = table.schema().await?;
        let stored_dim = embedding_dim(&schema)?;
        if stored_dim != vector.len() {
            return Err(StoreError::DimensionMismatch {
                expected: stored_dim,
                actual: vector.len(),
            });
        }

        let batches: Vec<RecordBatch> = table
            .vector_search(vector)?
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await?
            .try_collect()
            .await?;

        let mut neighbors = Vec::new();
        for batch in &batches {
            let ids = string_col(batch, "id")?;
            let texts = string_col(batch, "risky_text")?;
            let categories = string_col(batch, "category")?;
            let rewrites = string_col(batch, "safe_rewrite")?;
            let models = string_col(batch, "embedding_model")?;
            let distances = batch
                .column_by_name("_distance")
                .and_then(|col| col.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| StoreError::Other("missing _distance column".into()))?;

            for row in 0..batch.num_rows() {
                let indexed = models.value(row);
                if indexed != model_id {
                    return Err(StoreError::ModelMismatch {
                        indexed: indexed.to_string(),
                        current: model_id.to_string(),
                    });
                }
                let category_name = categories.value(row);
                let category = RiskCategory::from_name(category_name).ok_or_else(|| {
                    StoreError::Other(format!("unknown category {category_name:?} in index"))
                })?;
                neighbors.push(Neighbor {
                    id: ids.value(row).to_string(),
                    risky_text: texts.value(row).to_string(),
                    category,
                    safe_rewrite: rewrites.value(row).to_string(),
                    distance: distances.value(row),
                });
            }
        }
        Ok(neighbors)
    }

    /// Number of records in the index.
    pub async fn count(&self) -> Result<usize, StoreError> {
        let table = self.db.open_table(clauses::TABLE).execute().await?;
        Ok(table.count_rows(None).await?)
    }
}

fn build_batch(
    records: &[ClauseRecord],
    schema: &Arc<Schema>,
    dim: usize,
    model_id: &str,
) -> Result<RecordBatch, StoreError> {
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    let texts: Vec<&str> = records.iter().map(|r| r.risky_text.as_str()).collect();
    let categories: Vec<&str> = records.iter().map(|r| r.category.as_str()).collect();
    let rewrites: Vec<&str> = records.iter().map(|r| r.safe_rewrite.as_str()).collect();

    let mut embeddings = FixedSizeListBuilder::new(Float32Builder::new(), dim as i32);
    for record in records {
        embeddings.values().append_slice(&record.embedding);
        embeddings.append(true);
    }

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(texts)),
            Arc::new(StringArray::from(categories)),
            Arc::new(StringArray::from(rewrites)),
            Arc::new(embeddings.finish()),
            Arc::new(StringArray::from(vec![model_id; records.len()])),
        ],
    )?;
    Ok(batch)
}

fn embedding_dim(schema: &Schema) -> Result<usize, StoreError> {
    let field = schema
        .field_with_name("embedding")
        .map_err(|_| StoreError::Other("index table has no embedding column".into()))?;
    match field.data_type() {
        DataType::FixedSizeList(_, n) => Ok(*n as usize),
        other => Err(StoreError::Other(format!(
            "embedding column has unexpected type {other:?}"
        ))),
    }
}

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, StoreError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| StoreError::Other(format!("missing column {name:?}")))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| StoreError::Other(format!("column {name:?} is not utf8")))
}
