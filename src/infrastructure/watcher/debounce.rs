//! Mutation-coalescing debounce, generalized from the teacher's
//! `DebounceService` (which blocks repeat syncs within a window) into a
//! collector that coalesces bursts of edits to the same path into one
//! emission after the path goes quiet (spec §4.7).

use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Tracks the most recent pending event per key, flushing only once the key
/// has been quiet for `debounce` — repeated saves to the same file inside an
/// editor's write burst collapse to a single watcher emission.
pub struct Debouncer<T> {
    pending: DashMap<String, (Instant, T)>,
    debounce: Duration,
}

impl<T: Clone> Debouncer<T> {
    pub fn new(debounce: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            debounce,
        }
    }

    /// Record (or replace) the pending event for `key`, resetting its timer.
    pub fn touch(&self, key: &str, value: T) {
        self.pending.insert(key.to_string(), (Instant::now(), value));
    }

    /// Drop any pending event for `key` without emitting it (used when a
    /// later event supersedes it, e.g. a delete cancels a pending modify).
    pub fn cancel(&self, key: &str) {
        self.pending.remove(key);
    }

    /// Remove and return every entry that has been quiet for at least the
    /// debounce window.
    pub fn drain_ready(&self) -> Vec<T> {
        self.drain_ready_keyed().into_iter().map(|(_, value)| value).collect()
    }

    /// Like `drain_ready`, but keeps the key each value was recorded under.
    pub fn drain_ready_keyed(&self) -> Vec<(String, T)> {
        let now = Instant::now();
        let ready: Vec<String> = self
            .pending
            .iter()
            .filter(|entry| now.duration_since(entry.value().0) >= self.debounce)
            .map(|entry| entry.key().clone())
            .collect();

        ready
            .into_iter()
            .filter_map(|key| self.pending.remove(&key).map(|(k, (_, value))| (k, value)))
            .collect()
    }

    /// Number of paths currently awaiting their quiet period.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_only_after_quiet_period() {
        let debouncer: Debouncer<&'static str> = Debouncer::new(Duration::from_millis(20));
        debouncer.touch("a", "first");
        assert!(debouncer.drain_ready().is_empty());
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(debouncer.drain_ready(), vec!["first"]);
    }

    #[test]
    fn retouch_resets_the_timer() {
        let debouncer: Debouncer<&'static str> = Debouncer::new(Duration::from_millis(30));
        debouncer.touch("a", "first");
        std::thread::sleep(Duration::from_millis(20));
        debouncer.touch("a", "second");
        std::thread::sleep(Duration::from_millis(20));
        assert!(debouncer.drain_ready().is_empty());
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(debouncer.drain_ready(), vec!["second"]);
    }

    #[test]
    fn cancel_drops_pending_event() {
        let debouncer: Debouncer<&'static str> = Debouncer::new(Duration::from_millis(10));
        debouncer.touch("a", "first");
        debouncer.cancel("a");
        std::thread::sleep(Duration::from_millis(20));
        assert!(debouncer.drain_ready().is_empty());
    }
}
