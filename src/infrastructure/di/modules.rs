//! Shaku module definition for the engine's pluggable adapters.
//!
//! Scaled down from the teacher's multi-module hierarchy (adapters /
//! infrastructure / server / application, each its own `shaku::module!`):
//! this engine's core services (`StorageEngine`, `Dispatcher`,
//! `IndexingService`, `QueryEngine`) need per-repository runtime
//! configuration — a root path, a config snapshot — that doesn't fit
//! shaku's no-argument `Default`-component model, so they're built
//! directly in `server::builder` instead of resolved from a container.
//! Only the embedding/vector-store adapters are genuinely swappable
//! zero-argument components, so only they go through shaku here.

use crate::adapters::providers::embedding::NullEmbeddingProvider;
use crate::adapters::providers::vector_store::InMemoryVectorStoreProvider;
use crate::domain::ports::{EmbeddingProvider, VectorStoreProvider};
use shaku::{module, HasComponent};

/// Components this engine resolves through shaku rather than constructing
/// directly.
pub trait AdaptersModule: HasComponent<dyn EmbeddingProvider> + HasComponent<dyn VectorStoreProvider> {}

module! {
    pub AdaptersModuleImpl: AdaptersModule {
        components = [NullEmbeddingProvider, InMemoryVectorStoreProvider],
        providers = []
    }
}
