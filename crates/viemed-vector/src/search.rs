use anyhow::Result;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};

use viemed_core::types::{RetrievedDocument, SearchHit, SourceKind};

use crate::writer::LanceChildIndexer;

impl LanceChildIndexer {
    /// Nearest-neighbour search over the children table. LanceDB reports
    /// `_distance`; scores are `1 - distance` so higher is better, matching
    /// every other engine.
    pub async fn search_async(&self, query_vec: &[f32], k: usize) -> Result<Vec<RetrievedDocument>> {
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut stream = table
            .vector_search(query_vec.to_vec())?
            .limit(k)
            .execute()
            .await?;
        let mut hits = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            for i in 0..batch.num_rows() {
                let id = string_at(&batch, "id", i)?;
                let parent_id = string_at(&batch, "parent_id", i)?;
                let content = string_at(&batch, "content", i)?;
                let score = if let Some(distance_col) = batch.column_by_name("_distance") {
                    distance_col
                        .as_any()
                        .downcast_ref::<arrow_array::Float32Array>()
                        .map(|a| 1.0 - a.value(i))
                        .unwrap_or(0.5)
                } else {
                    0.5
                };
                hits.push(RetrievedDocument {
                    hit: SearchHit {
                        id,
                        score,
                        source: SourceKind::Vector,
                    },
                    parent_id,
                    content,
                });
            }
        }
        Ok(hits)
    }
}

pub(crate) fn string_at(batch: &arrow_array::RecordBatch, name: &str, row: usize) -> Result<String> {
    let col = batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<arrow_array::StringArray>())
        .ok_or_else(|| anyhow::anyhow!("column '{name}' missing or not utf8"))?;
    Ok(col.value(row).to_string())
}
