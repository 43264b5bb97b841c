//! Vector store contract for semantic search (spec §4.6).

use crate::domain::error::Result;
use async_trait::async_trait;

/// A single nearest-neighbor hit.
#[derive(Debug, Clone)]
pub struct VectorHit {
    /// The chunk this vector was computed from.
    pub chunk_id: String,
    /// Cosine similarity in `[-1.0, 1.0]`, higher is closer.
    pub score: f32,
}

/// A provider that stores embeddings and answers nearest-neighbor queries.
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert or replace the vector for `chunk_id`.
    async fn upsert(&self, chunk_id: &str, vector: &[f32]) -> Result<()>;

    /// Remove the vector for `chunk_id`, if present.
    async fn remove(&self, chunk_id: &str) -> Result<()>;

    /// Return the `limit` nearest vectors to `query`.
    async fn search(&self, query: &[f32], limit: usize) -> Result<Vec<VectorHit>>;

    /// Number of vectors currently stored.
    async fn len(&self) -> Result<usize>;

    /// Whether the store holds no vectors.
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
