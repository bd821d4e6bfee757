//! # Secondary dispatcher.
//!
//! Runs submitted work items on a small fixed worker pool behind a queue,
//! instead of on the caller's execution context, isolating a subsystem's
//! workload.
//!
//! ```text
//!   submit(ctx, job) ──► [ dispatch queue (FIFO) ] ──► worker ─► job()
//!          │ enqueue failed / scope cancelled               │ panic
//!          ▼                                                ▼
//!   ctx.cancel() ──► fallback target                   fatal hook
//! ```
//!
//! Lifecycle is `Running -> Draining -> Stopped`. [`SecondaryDispatcher::shutdown`]
//! closes the queue to new submissions; items already enqueued still drain.
//! A submission that cannot be enqueued is *rejected*: its context is
//! cancelled and the job is redirected to the fallback target so it still
//! eventually runs. If a worker observes its own scope cancelled while items
//! may remain queued, it closes the queue and pushes every remaining item
//! through the same rejection path — abnormal shutdown loses no work.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::closer::resource::Closable;
use crate::dispatcher::config::DispatcherConfig;
use crate::dispatcher::target::{BlockingPool, DispatchTarget, Job};
use crate::error::BoxError;
use crate::fatal::{panic_message, Abort, FatalHook, JobPanic};
use crate::once::Once;

type Submission = (CancellationToken, Job);

/// Why a work item was redirected to the fallback target.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The dispatch queue no longer accepts submissions.
    #[error("dispatch queue is closed")]
    QueueClosed,
    /// The dispatcher's own scope was cancelled.
    #[error("dispatcher scope was cancelled")]
    ScopeCancelled,
}

/// Bounded worker pool fed by a FIFO queue of `(context, job)` pairs.
///
/// Each pair is consumed exactly once: executed by a worker or redirected to
/// the fallback target. Callers never see a rejection directly; they observe
/// it through cancellation of the context they submitted under.
///
/// Must be created within a tokio runtime context.
pub struct SecondaryDispatcher {
    tx: RwLock<Option<mpsc::Sender<Submission>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    scope: CancellationToken,
    fallback: Arc<dyn DispatchTarget>,
}

impl SecondaryDispatcher {
    /// Starts the worker pool.
    ///
    /// `scope` is the dispatcher's own execution scope; cancelling it drains
    /// and redirects pending work. `fallback` receives rejected work;
    /// `fatal` receives internal invariant violations.
    pub fn new(
        config: DispatcherConfig,
        scope: CancellationToken,
        fallback: Arc<dyn DispatchTarget>,
        fatal: Arc<dyn FatalHook>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let drain = Arc::new(Once::new());

        let mut workers = Vec::with_capacity(config.workers.max(1));
        for id in 0..config.workers.max(1) {
            workers.push(tokio::spawn(worker(
                id,
                rx.clone(),
                scope.clone(),
                fallback.clone(),
                fatal.clone(),
                drain.clone(),
            )));
        }

        Self {
            tx: RwLock::new(Some(tx)),
            workers: Mutex::new(workers),
            scope,
            fallback,
        }
    }

    /// [`new`](Self::new) with the stock collaborators: [`BlockingPool`] as
    /// fallback and [`Abort`] as fatal hook.
    pub fn with_defaults(config: DispatcherConfig, scope: CancellationToken) -> Self {
        Self::new(config, scope, Arc::new(BlockingPool), Arc::new(Abort))
    }

    /// Submits a work item under `ctx`, waiting while the queue is full.
    ///
    /// If the item cannot be enqueued it is rejected: `ctx` is cancelled and
    /// the item goes to the fallback target instead.
    pub async fn submit(&self, ctx: CancellationToken, job: Job) {
        if self.scope.is_cancelled() {
            reject(
                self.fallback.as_ref(),
                ctx,
                job,
                RejectReason::ScopeCancelled,
            );
            return;
        }

        let sender = self.tx.read().await.clone();
        match sender {
            Some(sender) => {
                if let Err(mpsc::error::SendError((ctx, job))) = sender.send((ctx, job)).await {
                    reject(self.fallback.as_ref(), ctx, job, RejectReason::QueueClosed);
                }
            }
            None => reject(self.fallback.as_ref(), ctx, job, RejectReason::QueueClosed),
        }
    }

    /// [`submit`](Self::submit) for synchronous callers; runs its own
    /// independent blocking wait.
    pub fn submit_blocking(&self, ctx: CancellationToken, job: Job) {
        futures::executor::block_on(self.submit(ctx, job));
    }

    /// Transitions `Running -> Draining`: no further submissions are
    /// accepted, items already enqueued still run.
    pub async fn shutdown(&self) {
        if self.tx.write().await.take().is_some() {
            tracing::debug!("dispatch queue closed; draining remaining work");
        }
    }

    /// Waits for every worker to stop (`Stopped`). Call after
    /// [`shutdown`](Self::shutdown) or after cancelling the scope.
    pub async fn join(&self) {
        let workers = std::mem::take(&mut *self.workers.lock().await);
        for handle in workers {
            // A worker that routed into the fatal hook diverged; there is
            // nothing left to collect from it.
            let _ = handle.await;
        }
    }
}

impl Closable for SecondaryDispatcher {
    fn close(&mut self) -> Result<(), BoxError> {
        futures::executor::block_on(self.shutdown());
        Ok(())
    }
}

async fn worker(
    id: usize,
    rx: Arc<Mutex<mpsc::Receiver<Submission>>>,
    scope: CancellationToken,
    fallback: Arc<dyn DispatchTarget>,
    fatal: Arc<dyn FatalHook>,
    drain: Arc<Once>,
) {
    tracing::debug!(worker = id, "dispatcher worker started");
    loop {
        let mut queue = rx.lock().await;
        let item = tokio::select! {
            biased;
            _ = scope.cancelled() => {
                // Upstream cancellation, not a caller-initiated close: stop
                // new submissions, then push everything still queued through
                // the rejection path so no work is lost.
                drain.run(|| {
                    tracing::warn!(
                        worker = id,
                        "dispatcher scope cancelled; redirecting queued work"
                    );
                    queue.close();
                });
                // recv returns None only once the closed queue is truly
                // empty, including items whose send had already reserved a
                // slot when the queue closed.
                while let Some((ctx, job)) = queue.recv().await {
                    reject(fallback.as_ref(), ctx, job, RejectReason::ScopeCancelled);
                }
                return;
            }
            item = queue.recv() => item,
        };
        // Release the queue before running the job so siblings keep draining.
        drop(queue);

        match item {
            Some((_ctx, job)) => run_job(job, fatal.as_ref()),
            // Queue closed and fully drained.
            None => {
                tracing::debug!(worker = id, "dispatcher worker stopped");
                return;
            }
        }
    }
}

fn run_job(job: Job, fatal: &dyn FatalHook) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
        // Unexpected failure out of the worker loop: unrecoverable.
        fatal.fatal(Box::new(JobPanic(panic_message(payload.as_ref()))));
    }
}

fn reject(fallback: &dyn DispatchTarget, ctx: CancellationToken, job: Job, reason: RejectReason) {
    tracing::warn!(%reason, "work item rejected; redirecting to fallback target");
    ctx.cancel();
    fallback.dispatch(ctx, job);
}
