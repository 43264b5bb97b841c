//! Trait boundaries between the domain and everything concrete: plugins,
//! storage backends, embedding/vector providers, and the request handler.

pub mod embedding;
pub mod handler;
pub mod plugin;
pub mod registry;
pub mod resilience;
pub mod storage;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use handler::{Handler, Request, Response, ResponseError, ResponseStatus, ResponseWarning};
pub use plugin::LanguagePlugin;
pub use registry::PluginRegistry;
pub use resilience::{CircuitBreakerBackend, CircuitBreakerState, RateLimitResult, RateLimiterBackend};
pub use storage::{FulltextHit, SearchFilters, StorageEngine, StorageFactory, SymbolLookupResult};
pub use vector_store::{VectorHit, VectorStoreProvider};
