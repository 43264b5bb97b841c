//! Builds the shaku module holding the engine's default adapters.
//!
//! Callers needing a real embedding/vector-store backend instead of the
//! `Null`/in-memory defaults should build one directly and bypass this
//! container; shaku's `with_component_override` exists for exactly that
//! swap but this engine currently ships no second embedding backend to
//! override into (see DESIGN.md).

use super::modules::{AdaptersModule, AdaptersModuleImpl};
use crate::domain::ports::{EmbeddingProvider, VectorStoreProvider};
use std::sync::Arc;

/// Holds the resolved default adapters.
pub struct DiContainer {
    module: Arc<dyn AdaptersModule>,
}

impl DiContainer {
    /// Build the container with its default (null) components.
    pub fn build() -> Self {
        Self {
            module: Arc::new(AdaptersModuleImpl::builder().build()),
        }
    }

    /// Resolve the default embedding provider.
    pub fn embedding_provider(&self) -> Arc<dyn EmbeddingProvider> {
        self.module.resolve()
    }

    /// Resolve the default vector store provider.
    pub fn vector_store_provider(&self) -> Arc<dyn VectorStoreProvider> {
        self.module.resolve()
    }
}

impl Default for DiContainer {
    fn default() -> Self {
        Self::build()
    }
}
