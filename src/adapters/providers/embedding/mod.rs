//! `EmbeddingProvider` implementations.

pub mod null;

pub use null::NullEmbeddingProvider;
