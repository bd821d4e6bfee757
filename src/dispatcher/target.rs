//! # Dispatch targets.
//!
//! A [`DispatchTarget`] is anywhere a work item can be sent to run. The
//! [`SecondaryDispatcher`](crate::dispatcher::SecondaryDispatcher) uses one as
//! its fallback: rejected or cancellation-orphaned work is redirected there so
//! it still eventually runs — or is rejected by that target, terminating the
//! chain.

use tokio_util::sync::CancellationToken;

/// A unit of deferred execution. The dispatcher runs it exactly once and
/// never duplicates it.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// An execution target accepting `(context, work item)` pairs.
///
/// The context is opaque metadata passed through unchanged; targets may
/// inspect it (e.g. to skip already-cancelled work) but are expected to run
/// the job regardless, letting the job observe its own cancellation.
pub trait DispatchTarget: Send + Sync {
    /// Hands the job to this target for execution.
    fn dispatch(&self, ctx: CancellationToken, job: Job);
}

/// Fallback target running jobs on tokio's blocking thread pool.
///
/// Must be used within a tokio runtime context.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockingPool;

impl DispatchTarget for BlockingPool {
    fn dispatch(&self, _ctx: CancellationToken, job: Job) {
        tokio::task::spawn_blocking(job);
    }
}
