//! SQLite-backed persistence (spec §4.4, §6).

pub mod engine;
pub mod factory;
pub mod migrations;
pub mod schema;

pub use engine::SqliteStorageEngine;
pub use factory::SqliteStorageFactory;
