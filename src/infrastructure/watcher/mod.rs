//! Filesystem watching (spec §4.7): debounce, move detection, and the
//! `notify`-backed producer. `application::watcher_service::WatcherService`
//! is the consumer side that turns these events into index updates.

pub mod debounce;
pub mod events;

pub use debounce::Debouncer;
pub use events::{FileWatcher, WatcherConfig};
