//! In-flight work accounting.

use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::observability::metrics;

/// Counter of outstanding work units: requests currently executing plus any
/// registered background jobs.
///
/// Registration hands back an RAII guard, so the matching release happens on
/// every exit path, panics and cancellation included. The shutdown
/// coordinator waits on this counter when draining.
#[derive(Debug, Default)]
pub struct InFlightTracker {
    active: AtomicUsize,
    idle: Notify,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one unit of work. Dropping the guard releases it.
    pub fn register(self: &Arc<Self>) -> InFlightGuard {
        let previous = self.active.fetch_add(1, Ordering::SeqCst);
        metrics::record_in_flight(previous + 1);
        InFlightGuard {
            tracker: Arc::clone(self),
        }
    }

    /// Number of work units currently in flight.
    pub fn count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait until no work is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // register before checking, so a release landing in between
            // still wakes us
            notified.as_mut().enable();
            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Spawn a background job registered as in-flight for its whole life.
    ///
    /// The guard travels into the task and a panic inside the job is caught
    /// and logged, so the registration is released no matter how the job
    /// ends.
    pub fn spawn<F>(self: &Arc<Self>, job: &'static str, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = self.register();
        tokio::spawn(async move {
            let _guard = guard;
            if let Err(payload) = AssertUnwindSafe(fut).catch_unwind().await {
                tracing::error!(job, panic = panic_message(payload.as_ref()), "background job panicked");
            }
        })
    }
}

/// RAII registration for one unit of in-flight work.
#[derive(Debug)]
pub struct InFlightGuard {
    tracker: Arc<InFlightTracker>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let previous = self.tracker.active.fetch_sub(1, Ordering::SeqCst);
        metrics::record_in_flight(previous - 1);
        if previous == 1 {
            self.tracker.idle.notify_waiters();
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
