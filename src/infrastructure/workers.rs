//! Bounded CPU worker pool for parse/chunk work (spec §5), sized from the
//! `worker_threads` configuration key. Plugin extraction is CPU-bound
//! (tree-sitter parsing, regex scanning); running it on a dedicated `rayon`
//! pool keeps it off both the Tokio reactor threads and Tokio's own
//! blocking-task pool, which the Handler's I/O paths also share.

use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio::sync::oneshot;

/// Wraps a `rayon::ThreadPool`, bridging its synchronous `spawn` into async
/// callers via a oneshot channel.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// `threads == 0` lets rayon pick its default (available parallelism),
    /// matching `Config::worker_threads`'s documented meaning.
    pub fn new(threads: usize) -> Self {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("codeindex-worker-{index}"))
            .build()
            .expect("failed to build worker thread pool");
        Self { pool }
    }

    /// Run `f` on the worker pool and await its result from async context.
    /// If `f` panics, rayon catches it inside the job and the sender is
    /// dropped without sending; that surfaces here as `Err(WorkerPanicked)`
    /// rather than panicking the calling task.
    pub async fn run<F, T>(&self, f: F) -> std::result::Result<T, WorkerPanicked>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.pool.spawn(move || {
            let _ = tx.send(f());
        });
        rx.await.map_err(|_| WorkerPanicked)
    }
}

/// The worker pool job panicked before producing a result.
#[derive(Debug)]
pub struct WorkerPanicked;

impl std::fmt::Display for WorkerPanicked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker pool task panicked")
    }
}

impl std::error::Error for WorkerPanicked {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_a_closure_and_returns_its_value() {
        let pool = WorkerPool::new(2);
        let result = pool.run(|| 2 + 2).await.expect("job completes");
        assert_eq!(result, 4);
    }

    #[tokio::test]
    async fn zero_threads_falls_back_to_rayon_default() {
        let pool = WorkerPool::new(0);
        let result = pool
            .run(|| std::thread::current().name().map(|n| n.to_string()))
            .await
            .expect("job completes");
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn a_panicking_job_surfaces_as_worker_panicked_not_a_task_panic() {
        let pool = WorkerPool::new(1);
        let result = pool.run(|| -> i32 { panic!("boom") }).await;
        assert!(result.is_err());
    }
}
