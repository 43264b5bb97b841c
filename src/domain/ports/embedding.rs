//! Semantic embedding provider contract.
//!
//! Decouples the Query Engine and Dispatcher from any particular embedding
//! backend. An `EmbedderError` from any method signals callers to continue
//! with lexical-only results rather than fail the whole request (spec §4.6).

use crate::domain::error::Result;
use async_trait::async_trait;

/// A provider that turns text into vectors for semantic search.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single piece of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts; providers that support batching should
    /// override this for efficiency. The default calls `embed` in sequence.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Declared output dimensionality.
    fn dimensions(&self) -> usize;

    /// Stable name persisted alongside vectors (`Embedding::model_name`).
    fn model_name(&self) -> &str;

    /// Cheap liveness check; default embeds a short fixed string.
    async fn health_check(&self) -> Result<()> {
        self.embed("health check").await?;
        Ok(())
    }
}
