//! Thread pool for translation jobs.
//!
//! Uses work-stealing deques:
//! - Jobs are pushed to a global injector
//! - Workers drain their own deque, then the injector, then steal from peers
//! - Zero lock contention between workers
//!
//! Dropping the pool waits for queued jobs to drain.

use crossbeam::deque::{Injector, Stealer, Worker};
use log::{error, trace};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Worker pool with work-stealing.
///
/// # Example
/// ```ignore
/// let workers = Workers::new(4);
/// let (tx, rx) = crossbeam_channel::unbounded();
/// workers.execute(move || {
///     tx.send(translate()).ok();
/// });
/// ```
pub struct Workers {
    injector: Arc<Injector<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl Workers {
    /// Create a pool of `num_threads` workers (at least one).
    pub fn new(num_threads: usize) -> Self {
        let num_threads = num_threads.max(1);
        let injector: Arc<Injector<Job>> = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers_local: Vec<Worker<Job>> = Vec::new();
        let mut stealers: Vec<Stealer<Job>> = Vec::new();
        let mut handles = Vec::new();

        for _ in 0..num_threads {
            let worker: Worker<Job> = Worker::new_fifo();
            stealers.push(worker.stealer());
            workers_local.push(worker);
        }

        for (worker_id, worker) in workers_local.into_iter().enumerate() {
            let injector = Arc::clone(&injector);
            let shutdown = Arc::clone(&shutdown);
            let stealers = stealers.clone();

            let spawned = thread::Builder::new()
                .name(format!("gmdump-worker-{}", worker_id))
                .spawn(move || {
                    trace!("Worker {} started", worker_id);
                    loop {
                        if let Some(job) = find_job(&worker, &injector, &stealers) {
                            job();
                            continue;
                        }

                        // Queue is empty: leave only when asked to
                        if shutdown.load(Ordering::Acquire) {
                            break;
                        }
                        thread::sleep(Duration::from_millis(1));
                    }
                    trace!("Worker {} stopped", worker_id);
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => error!("Failed to spawn worker {}: {}", worker_id, e),
            }
        }

        trace!("Workers initialized: {} threads (work-stealing)", handles.len());

        Self {
            injector,
            handles,
            shutdown,
        }
    }

    /// Number of running worker threads.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Queue a closure for a worker thread.
    ///
    /// Runs inline when no worker could be spawned.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.handles.is_empty() {
            f();
            return;
        }
        self.injector.push(Box::new(f));
    }
}

/// Own deque first, then the global injector, then peers.
fn find_job(worker: &Worker<Job>, injector: &Injector<Job>, stealers: &[Stealer<Job>]) -> Option<Job> {
    if let Some(job) = worker.pop() {
        return Some(job);
    }
    loop {
        let stolen = injector
            .steal_batch_and_pop(worker)
            .or_else(|| stealers.iter().map(|s| s.steal()).collect());
        if stolen.is_retry() {
            continue;
        }
        return stolen.success();
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        let num_threads = self.handles.len();
        trace!("Workers shutting down ({} threads)...", num_threads);

        // Workers finish queued jobs before they see the flag
        self.shutdown.store(true, Ordering::Release);

        for handle in std::mem::take(&mut self.handles) {
            if handle.join().is_err() {
                error!("Worker thread panicked during shutdown");
            }
        }

        trace!("All {} workers stopped", num_threads);
    }
}
