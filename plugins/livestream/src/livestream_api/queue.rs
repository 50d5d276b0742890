//! Serialized dispatch of outbound API requests.
//!
//! Livestream rate-limits per account, so every request made through a [`RequestQueue`] is
//! executed one at a time, in arrival order, with a fixed pause after each one completes.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// The queue worker went away before the request's outcome could be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request queue worker is no longer running")]
pub struct QueueClosed;

/// A FIFO queue that runs at most one request at a time.
///
/// After each request settles (successfully or not) the worker waits for the configured interval
/// before starting the next one, so `N` queued requests take at least `(N - 1) * interval` to
/// drain. Requests are never dropped or cancelled once enqueued, even if the caller stops waiting
/// for the result.
///
/// Cloning the queue yields another handle to the same worker.
#[derive(Debug, Clone)]
pub struct RequestQueue {
    jobs: mpsc::UnboundedSender<Job>,
    interval: Duration,
}

impl RequestQueue {
    /// Starts the queue worker.
    ///
    /// Must be called from within a Tokio runtime. The worker exits once every handle is dropped
    /// and the backlog has drained.
    pub fn new(interval: Duration) -> Self {
        let (jobs, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, interval));
        Self { jobs, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Appends `request` to the queue and returns a future for its outcome.
    ///
    /// The request is placed in the queue when this method is called, not when the returned
    /// future is first polled, so calls made in sequence are dispatched in that same sequence.
    /// `request` is invoked exactly once, by the worker, when its turn comes.
    pub fn enqueue<F, Fut, T, E>(
        &self,
        request: F,
    ) -> impl Future<Output = Result<T, E>> + Send + use<F, Fut, T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: From<QueueClosed> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let outcome = request().await;
            // nobody may be listening any more, which is fine
            let _ = done_tx.send(outcome);
        });
        let accepted = self.jobs.send(job).is_ok();

        async move {
            if !accepted {
                return Err(E::from(QueueClosed));
            }
            match done_rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(E::from(QueueClosed)),
            }
        }
    }
}

async fn run(mut jobs: mpsc::UnboundedReceiver<Job>, interval: Duration) {
    let mut dispatched: u64 = 0;
    while let Some(job) = jobs.recv().await {
        dispatched += 1;
        tracing::trace!(dispatched, backlog = jobs.len(), "dispatching queued request");

        // run on its own task so that a panicking request can't take the worker down with it
        if let Err(e) = tokio::spawn(job).await {
            tracing::error!(error = %e, "queued request did not complete");
        }

        tokio::time::sleep(interval).await;
    }
    tracing::debug!(dispatched, "request queue closed");
}
