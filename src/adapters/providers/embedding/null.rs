//! Null embedding provider, used when `semantic.enabled = false` or as the
//! DI default before a real provider is wired in (spec §6 `semantic.*`).

use crate::domain::error::Result;
use crate::domain::ports::EmbeddingProvider;
use async_trait::async_trait;

/// Returns a fixed-size zero vector for every input. Keeps the hybrid search
/// path exercised in tests without requiring a network embedding backend.
#[derive(Clone, shaku::Component)]
#[shaku(interface = EmbeddingProvider)]
pub struct NullEmbeddingProvider {
    #[shaku(default = 8)]
    dimensions: usize,
}

impl NullEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for NullEmbeddingProvider {
    fn default() -> Self {
        Self::new(8)
    }
}

#[async_trait]
impl EmbeddingProvider for NullEmbeddingProvider {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.0; self.dimensions])
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeds_to_the_declared_dimension() {
        let provider = NullEmbeddingProvider::new(4);
        let vector = provider.embed("anything").await.unwrap();
        assert_eq!(vector.len(), 4);
    }
}
