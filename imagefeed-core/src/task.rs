//! Glue between the async loaders and callback-driven callers.
//!
//! [`LoadTask`] runs a load in the background and hands the result to a
//! completion closure; [`MainQueue`] lets a UI-like owner thread receive those
//! completions on its own schedule; [`publisher`] exposes a load as a stream.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::trace;

use crate::error::LoadError;

type Completion<T> = Box<dyn FnOnce(Result<T, LoadError>) + Send>;

trait Cancel: Send + Sync {
    fn cancel(&self) -> bool;
}

/// Holds the completion until it is either delivered or cancelled.
struct CompletionSlot<T> {
    completion: Mutex<Option<Completion<T>>>,
}

impl<T> CompletionSlot<T> {
    fn take(&self) -> Option<Completion<T>> {
        self.completion
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl<T: Send> Cancel for CompletionSlot<T> {
    fn cancel(&self) -> bool {
        self.take().is_some()
    }
}

/// Handle to a load running on the tokio runtime.
///
/// The completion is invoked at most once. After [`LoadTask::cancel`] returns
/// it is never invoked. Dropping the handle cancels the load; call
/// [`LoadTask::detach`] to let it run unobserved instead.
#[must_use = "dropping a LoadTask cancels it"]
pub struct LoadTask {
    slot: Arc<dyn Cancel>,
    abort: AbortHandle,
    detached: bool,
}

impl LoadTask {
    /// Must be called from within a tokio runtime.
    pub fn spawn<T, Fut, F>(load: Fut, completion: F) -> Self
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, LoadError>> + Send + 'static,
        F: FnOnce(Result<T, LoadError>) + Send + 'static,
    {
        let slot = Arc::new(CompletionSlot {
            completion: Mutex::new(Some(Box::new(completion) as Completion<T>)),
        });
        let runner_slot = Arc::clone(&slot);
        let handle = tokio::spawn(async move {
            let result = load.await;
            match runner_slot.take() {
                Some(completion) => completion(result),
                None => trace!("load finished after cancellation, dropping result"),
            }
        });
        Self {
            slot,
            abort: handle.abort_handle(),
            detached: false,
        }
    }

    /// Idempotent. Returns true only for the call that actually cancelled.
    pub fn cancel(&self) -> bool {
        let cancelled = self.slot.cancel();
        self.abort.abort();
        cancelled
    }

    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for LoadTask {
    fn drop(&mut self) {
        if !self.detached {
            self.cancel();
        }
    }
}

type Job = Box<dyn FnOnce() + Send>;

/// A designated execution context: completions dispatched to it run only when
/// the owner calls [`MainQueue::run_pending`] or [`MainQueue::run_next`].
pub struct MainQueue {
    jobs: mpsc::UnboundedReceiver<Job>,
}

#[derive(Clone)]
pub struct MainQueueHandle {
    jobs: mpsc::UnboundedSender<Job>,
}

impl MainQueue {
    pub fn new() -> (Self, MainQueueHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { jobs: rx }, MainQueueHandle { jobs: tx })
    }

    /// Runs every job queued so far on the calling thread.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.jobs.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Waits for the next job and runs it. Returns false once every handle,
    /// and every completion dispatched through one, is gone.
    pub async fn run_next(&mut self) -> bool {
        match self.jobs.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }
}

impl MainQueueHandle {
    /// Wraps `completion` so that calling the result only enqueues it.
    pub fn dispatch<T, F>(&self, completion: F) -> impl FnOnce(T) + Send + 'static
    where
        T: Send + 'static,
        F: FnOnce(T) + Send + 'static,
    {
        let jobs = self.jobs.clone();
        move |value: T| {
            if jobs.send(Box::new(move || completion(value))).is_err() {
                trace!("main queue dropped, discarding completion");
            }
        }
    }
}

/// Adapts a load into a stream that yields exactly one item and ends.
/// Dropping the stream cancels the load.
pub fn publisher<T, Fut>(load: Fut) -> BoxStream<'static, Result<T, LoadError>>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, LoadError>> + Send + 'static,
{
    stream::once(load).boxed()
}
