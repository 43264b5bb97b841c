//! Configuration surface loading (spec §6) and hot-reload.

pub mod loader;
pub mod types;
pub mod watcher;

pub use loader::ConfigLoader;
pub use types::{Config, RerankConfig, SemanticConfig};
pub use watcher::ConfigWatcher;
