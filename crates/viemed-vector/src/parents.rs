//! Parent chunk storage.
//!
//! Retrieval matches on children; generation wants the enclosing parent.
//! Parents are kept in their own LanceDB table with `merge_insert` upsert on
//! `id`, so re-ingesting a document replaces its sections in place.

use anyhow::Result;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::RwLock;

use arrow_array::{Int32Array, RecordBatch, RecordBatchIterator, StringArray};

use viemed_core::traits::ParentStore;
use viemed_core::types::ParentChunk;

use crate::schema::build_parents_schema;
use crate::search::string_at;

pub struct LanceParentStore {
    db: Connection,
    table_name: String,
}

impl LanceParentStore {
    pub async fn connect(db_path: &Path, table_name: &str) -> Result<Self> {
        let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
        Ok(Self {
            db,
            table_name: table_name.to_string(),
        })
    }

    async fn ensure_table(&self) -> Result<()> {
        let names = self.db.table_names().execute().await?;
        if names.contains(&self.table_name) {
            return Ok(());
        }
        // create empty table with 0 rows
        let schema = build_parents_schema();
        let batches: Vec<std::result::Result<RecordBatch, arrow_schema::ArrowError>> = vec![];
        let iter = RecordBatchIterator::new(batches.into_iter(), schema);
        self.db
            .create_table(&self.table_name, Box::new(iter))
            .execute()
            .await?;
        Ok(())
    }

    pub async fn put_async(&self, parents: &[ParentChunk]) -> Result<()> {
        if parents.is_empty() {
            return Ok(());
        }
        self.ensure_table().await?;
        let table = self.db.open_table(&self.table_name).execute().await?;
        let batch = parents_to_record_batch(parents)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(
            vec![Ok(batch)].into_iter(),
            schema,
        ));
        // Upsert behavior via merge_insert: id is unique
        let mut mi = table.merge_insert(&["id"]);
        mi.when_matched_update_all(None).when_not_matched_insert_all();
        let _ = mi.execute(reader).await?;
        Ok(())
    }

    pub async fn get_async(&self, id: &str) -> Result<Option<ParentChunk>> {
        let names = self.db.table_names().execute().await?;
        if !names.contains(&self.table_name) {
            return Ok(None);
        }
        let table = self.db.open_table(&self.table_name).execute().await?;
        let predicate = format!("id = '{}'", id.replace('\'', "''"));
        let mut stream = table.query().only_if(&predicate).execute().await?;
        while let Some(batch) = stream.try_next().await? {
            if batch.num_rows() == 0 {
                continue;
            }
            let depth_col = batch
                .column_by_name("section_depth")
                .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
                .ok_or_else(|| anyhow::anyhow!("section_depth column missing"))?;
            let count_col = batch
                .column_by_name("char_count")
                .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
                .ok_or_else(|| anyhow::anyhow!("char_count column missing"))?;
            return Ok(Some(ParentChunk {
                id: string_at(&batch, "id", 0)?,
                doc_id: string_at(&batch, "doc_id", 0)?,
                doc_path: string_at(&batch, "doc_path", 0)?,
                header: string_at(&batch, "header", 0)?,
                section_depth: depth_col.value(0) as usize,
                content: string_at(&batch, "content", 0)?,
                char_count: count_col.value(0) as usize,
            }));
        }
        Ok(None)
    }
}

fn parents_to_record_batch(parents: &[ParentChunk]) -> Result<RecordBatch> {
    let schema = build_parents_schema();
    let mut ids = Vec::new();
    let mut doc_ids = Vec::new();
    let mut doc_paths = Vec::new();
    let mut headers = Vec::new();
    let mut depths = Vec::new();
    let mut contents = Vec::new();
    let mut counts = Vec::new();
    for p in parents {
        ids.push(p.id.clone());
        doc_ids.push(p.doc_id.clone());
        doc_paths.push(p.doc_path.clone());
        headers.push(p.header.clone());
        depths.push(p.section_depth as i32);
        contents.push(p.content.clone());
        counts.push(p.char_count as i32);
    }
    Ok(RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(doc_ids)),
            Arc::new(StringArray::from(doc_paths)),
            Arc::new(StringArray::from(headers)),
            Arc::new(Int32Array::from(depths)),
            Arc::new(StringArray::from(contents)),
            Arc::new(Int32Array::from(counts)),
        ],
    )?)
}

impl ParentStore for LanceParentStore {
    fn put(&self, parents: &[ParentChunk]) -> Result<()> {
        crate::writer::run_blocking(self.put_async(parents))?
    }

    fn get(&self, id: &str) -> Result<Option<ParentChunk>> {
        crate::writer::run_blocking(self.get_async(id))?
    }
}

/// In-memory store for tests and evaluation runs.
#[derive(Default)]
pub struct MemoryParentStore {
    map: RwLock<HashMap<String, ParentChunk>>,
}

impl MemoryParentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParentStore for MemoryParentStore {
    fn put(&self, parents: &[ParentChunk]) -> Result<()> {
        let mut map = self
            .map
            .write()
            .map_err(|_| anyhow::anyhow!("parent store lock poisoned"))?;
        for p in parents {
            map.insert(p.id.clone(), p.clone());
        }
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<ParentChunk>> {
        let map = self
            .map
            .read()
            .map_err(|_| anyhow::anyhow!("parent store lock poisoned"))?;
        Ok(map.get(id).cloned())
    }
}
