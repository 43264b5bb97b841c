//! `VectorStoreProvider` implementations. The default runtime path does
//! not use this port: `StorageEngine`'s embedded SQLite `embeddings` table
//! is the vector backend this engine ships (see DESIGN.md). This module
//! exists so a pluggable external backend can be swapped in later without
//! touching `application::query`.

pub mod in_memory;

pub use in_memory::InMemoryVectorStoreProvider;
