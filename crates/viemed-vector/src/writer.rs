use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::{connect, Connection};
use std::path::Path;
use std::sync::Arc;

use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray};

use viemed_core::traits::VectorIndexer;
use viemed_core::types::{ChildChunk, RetrievedDocument};

use crate::schema::{build_children_schema, EMBEDDING_DIM};

pub struct LanceChildIndexer {
    pub(crate) db: Connection,
    pub(crate) table_name: String,
}

impl LanceChildIndexer {
    pub async fn connect(db_path: &Path, table_name: &str) -> Result<Self> {
        let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
        Ok(Self {
            db,
            table_name: table_name.to_string(),
        })
    }

    pub async fn index_async(
        &self,
        chunks: &[ChildChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        if chunks.is_empty() {
            println!("No chunks to index");
            return Ok(());
        }
        anyhow::ensure!(
            chunks.len() == embeddings.len(),
            "chunks and embeddings length must match"
        );
        println!(
            "Indexing {} children into LanceDB table: {}",
            chunks.len(),
            self.table_name
        );
        let pb = ProgressBar::new(chunks.len() as u64);
        #[allow(clippy::expect_used)]
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
                .expect("progress template")
                .progress_chars("#>-"),
        );
        let batch_size = 1000usize;
        let mut processed = 0usize;
        for (chunk_batch, emb_batch) in chunks.chunks(batch_size).zip(embeddings.chunks(batch_size))
        {
            self.insert_batch(chunk_batch, emb_batch).await?;
            processed += chunk_batch.len();
            pb.set_position(processed as u64);
        }
        pb.finish_with_message("✅ LanceDB indexing completed!");
        println!("📊 Indexed {processed} children into LanceDB");
        Ok(())
    }

    async fn insert_batch(&self, chunks: &[ChildChunk], embeddings: &[Vec<f32>]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        let record_batch = chunks_to_record_batch(chunks, embeddings)?;
        let schema = record_batch.schema();
        let reader = Box::new(RecordBatchIterator::new(
            vec![Ok(record_batch)].into_iter(),
            schema,
        ));
        if self
            .db
            .table_names()
            .execute()
            .await?
            .contains(&self.table_name)
        {
            self.db
                .open_table(&self.table_name)
                .execute()
                .await?
                .add(reader)
                .execute()
                .await?;
        } else {
            self.db
                .create_table(&self.table_name, reader)
                .execute()
                .await?;
        }
        Ok(())
    }
}

fn chunks_to_record_batch(chunks: &[ChildChunk], embeddings: &[Vec<f32>]) -> Result<RecordBatch> {
    let schema = build_children_schema();
    let mut ids = Vec::new();
    let mut parent_ids = Vec::new();
    let mut doc_ids = Vec::new();
    let mut doc_paths = Vec::new();
    let mut headers = Vec::new();
    let mut contents = Vec::new();
    let mut chunk_indices = Vec::new();
    let mut totals = Vec::new();
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
    for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
        ids.push(chunk.id.clone());
        parent_ids.push(chunk.parent_id.clone());
        doc_ids.push(chunk.doc_id.clone());
        doc_paths.push(chunk.doc_path.clone());
        headers.push(chunk.header.clone());
        contents.push(chunk.content.clone());
        chunk_indices.push(chunk.chunk_index as i32);
        totals.push(chunk.total_children as i32);
        vectors.push(Some(embedding.iter().map(|&x| Some(x)).collect()));
    }
    let record_batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(parent_ids)),
            Arc::new(StringArray::from(doc_ids)),
            Arc::new(StringArray::from(doc_paths)),
            Arc::new(StringArray::from(headers)),
            Arc::new(StringArray::from(contents)),
            Arc::new(Int32Array::from(chunk_indices)),
            Arc::new(Int32Array::from(totals)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<
                arrow_array::types::Float32Type,
                _,
                _,
            >(vectors.into_iter(), EMBEDDING_DIM)),
        ],
    )?;
    Ok(record_batch)
}

/// Drive a storage future from sync code. Reuses the ambient runtime when one
/// exists (callers there must already be inside `block_in_place`), otherwise
/// spins up a throwaway runtime.
pub(crate) fn run_blocking<F>(future: F) -> Result<F::Output>
where
    F: std::future::Future,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Ok(handle.block_on(future)),
        Err(_) => Ok(tokio::runtime::Runtime::new()?.block_on(future)),
    }
}

impl VectorIndexer for LanceChildIndexer {
    fn index(&self, chunks: &[ChildChunk], embeddings: &[Vec<f32>]) -> Result<()> {
        run_blocking(self.index_async(chunks, embeddings))?
    }

    fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<RetrievedDocument>> {
        run_blocking(self.search_async(query_vec, k))?
    }
}
