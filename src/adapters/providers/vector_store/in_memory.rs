//! In-process vector store, used for tests and as the DI default before a
//! pluggable external backend is wired in (spec §4.6). The default runtime
//! path does not use this: `StorageEngine` owns the embedded SQLite vector
//! table directly, since that is the only backend this engine ships.

use crate::domain::error::Result;
use crate::domain::ports::vector_store::{VectorHit, VectorStoreProvider};
use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Clone, Default, shaku::Component)]
#[shaku(interface = VectorStoreProvider)]
pub struct InMemoryVectorStoreProvider {
    #[shaku(default)]
    vectors: DashMap<String, Vec<f32>>,
}

impl InMemoryVectorStoreProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStoreProvider for InMemoryVectorStoreProvider {
    async fn upsert(&self, chunk_id: &str, vector: &[f32]) -> Result<()> {
        self.vectors.insert(chunk_id.to_string(), vector.to_vec());
        Ok(())
    }

    async fn remove(&self, chunk_id: &str) -> Result<()> {
        self.vectors.remove(chunk_id);
        Ok(())
    }

    async fn search(&self, query: &[f32], limit: usize) -> Result<Vec<VectorHit>> {
        let mut hits: Vec<VectorHit> = self
            .vectors
            .iter()
            .map(|entry| VectorHit {
                chunk_id: entry.key().clone(),
                score: cosine_similarity(query, entry.value()),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.vectors.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ranks_by_cosine_similarity() {
        let store = InMemoryVectorStoreProvider::new();
        store.upsert("a", &[1.0, 0.0]).await.unwrap();
        store.upsert("b", &[0.0, 1.0]).await.unwrap();

        let hits = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits[0].chunk_id, "a");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn remove_drops_the_vector() {
        let store = InMemoryVectorStoreProvider::new();
        store.upsert("a", &[1.0, 0.0]).await.unwrap();
        store.remove("a").await.unwrap();
        assert!(store.is_empty().await.unwrap());
    }
}
