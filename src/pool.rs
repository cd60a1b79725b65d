//! Concurrency-bounded, paced execution of fetch tasks.
//!
//! Multi-page sources fan their page requests out through a [`FetchPool`]
//! so that at most `limit` requests are in flight at once and consecutive
//! requests are spaced out by a fixed delay, to avoid tripping rate limits
//! on the scheduling backends.
//!
//! The pool only executes; it never looks at what the tasks return. Page
//! error policy belongs to the adapters, which absorb their own failures
//! into [`crate::models::ScrapeResult`] values before the pool ever sees
//! them.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::sleep;

/// Runs a batch of futures with bounded concurrency and inter-request
/// pacing.
#[derive(Debug)]
pub struct FetchPool {
    semaphore: Semaphore,
    delay: Duration,
}

impl FetchPool {
    /// Create a pool allowing at most `limit` tasks in flight, with `delay`
    /// slept by every started task after the first.
    pub fn new(limit: usize, delay: Duration) -> Self {
        FetchPool {
            semaphore: Semaphore::new(limit.max(1)),
            delay,
        }
    }

    /// Execute all tasks and return their outputs in submission order.
    ///
    /// Completion order is unconstrained (a slow early task does not hold
    /// up later slots) but the returned `Vec` always lines up index-for-
    /// index with `tasks`. The very first task to take a slot starts
    /// immediately; every later one sleeps the pacing delay after taking
    /// its slot, before running.
    pub async fn run_all<F>(&self, tasks: Vec<F>) -> Vec<F::Output>
    where
        F: Future,
    {
        let started = AtomicUsize::new(0);
        let paced = tasks.into_iter().map(|task| {
            let started = &started;
            async move {
                // Never closed for the lifetime of the pool.
                let _permit = self
                    .semaphore
                    .acquire()
                    .await
                    .expect("fetch pool semaphore closed");
                if started.fetch_add(1, Ordering::SeqCst) > 0 {
                    sleep(self.delay).await;
                }
                task.await
            }
        });
        join_all(paced).await
    }
}
