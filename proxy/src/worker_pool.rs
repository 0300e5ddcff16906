//! Fixed-size, failure-tolerant task executor.
//!
//! A pool spawns `size` durable worker threads once at construction. Each
//! worker drains a shared job queue and survives any panic inside a job,
//! matching the teacher crate's preference for long-lived, carefully
//! invariant-maintained structures over cheap-to-discard ones.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Sender};
use tracing::{debug, error};

/// A unit of work handed to a worker, or the cooperative shutdown signal.
enum Job {
    Work(Box<dyn FnOnce() + Send + 'static>),
    Exit,
}

/// A fixed pool of worker threads draining a shared, unbounded FIFO queue.
pub struct WorkerPool {
    sender: Sender<Job>,
    workers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .finish_non_exhaustive()
    }
}

impl WorkerPool {
    /// Spawns `size` workers, each named `proxy-worker-<id>`.
    pub fn new(size: usize) -> Self {
        let (sender, receiver) = unbounded::<Job>();
        let workers = (0..size)
            .map(|id| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("proxy-worker-{id}"))
                    .spawn(move || loop {
                        match receiver.recv() {
                            Ok(Job::Work(job)) => {
                                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                                    error!("worker {id} job panicked, continuing");
                                }
                            }
                            Ok(Job::Exit) | Err(_) => {
                                debug!("worker {id} exiting");
                                break;
                            }
                        }
                    })
                    .expect("failed to spawn worker thread")
            })
            .collect();

        WorkerPool { sender, workers }
    }

    /// Enqueues a job. The queue is unbounded, so this never blocks.
    pub fn schedule<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // Ignoring the send error: it only fires once every worker has
        // already exited, which only happens after `shutdown`.
        let _ = self.sender.send(Job::Work(Box::new(job)));
    }

    /// Enqueues one exit marker per worker, then joins every worker thread.
    ///
    /// Jobs scheduled before this call drain first: the queue is FIFO, so
    /// each worker processes every prior job before reaching its own exit
    /// marker.
    pub fn shutdown(self) {
        for _ in 0..self.workers.len() {
            let _ = self.sender.send(Job::Exit);
        }
        for worker in self.workers {
            let _ = worker.join();
        }
    }
}
