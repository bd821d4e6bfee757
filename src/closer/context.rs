//! # Structured closer.
//!
//! Releases one or many [`Resource`]s such that every release is attempted
//! exactly once regardless of earlier failures, no failure is silently
//! dropped, and at most one error surfaces to the caller.
//!
//! Two shapes are provided:
//!
//! - [`Closer`] — a closing context carrying a [`Shade`]; resources are fed to
//!   it one by one (or in batches, sequentially or in parallel) and
//!   [`Closer::finish`] reports the merged failure.
//! - Free functions [`close_all`] / [`close_all_parallel`] /
//!   [`with_sync`] / [`with_async`] for the common one-shot patterns.
//!
//! Parallel teardown is failure-isolated: each release runs in its own
//! spawned task, so one resource failing (or panicking) never cancels or
//! prevents a sibling's release. Results are aggregated in resource order
//! once all have completed.

use futures::future::BoxFuture;
use tokio::task::JoinHandle;

use crate::closer::resource::{AsyncClosable, Closable, Resource};
use crate::error::{AggregateError, BoxError, Shade};

/// Label for the synthetic aggregate created by multi-object close paths.
pub const MULTI_CLOSE_FAILURE: &str = "multi-close failure";

/// Label for the synthetic aggregate created by a [`Closer`] context.
pub const CLOSE_CONTEXT_FAILURE: &str = "close context failure";

/// Closing context accumulating release failures into a [`Shade`].
///
/// # Example
/// ```
/// # async fn teardown(conn: mooring::Resource, file: mooring::Resource) {
/// use mooring::Closer;
///
/// let mut closer = Closer::new();
/// closer.close(conn).await;
/// closer.close(file).await;
/// if let Some(err) = closer.finish() {
///     eprintln!("teardown failed: {err}");
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct Closer {
    shade: Shade,
}

impl Default for Closer {
    fn default() -> Self {
        Self::new()
    }
}

impl Closer {
    /// Context with no prior failure; the first release failure synthesizes
    /// an aggregate labeled [`CLOSE_CONTEXT_FAILURE`].
    pub fn new() -> Self {
        Self {
            shade: Shade::synthetic(CLOSE_CONTEXT_FAILURE),
        }
    }

    /// Context seeded with an in-flight failure, which stays primary.
    pub fn with_failure(primary: BoxError) -> Self {
        Self {
            shade: Shade::with_primary(primary),
        }
    }

    /// Releases one resource, absorbing any failure.
    pub async fn close(&mut self, resource: Resource) {
        self.shade.absorb(resource.close().await);
    }

    /// Releases one resource from synchronous code.
    pub fn close_blocking(&mut self, resource: Resource) {
        self.shade.absorb(resource.close_blocking());
    }

    /// Releases resources sequentially, in the given order.
    pub async fn close_all(&mut self, resources: impl IntoIterator<Item = Resource>) {
        for resource in resources {
            self.close(resource).await;
        }
    }

    /// Releases every resource concurrently, one spawned task each, then
    /// aggregates failures in resource order once all have completed.
    ///
    /// Failure-isolated: a failing or panicking release never cancels a
    /// sibling's release. A panic is absorbed as that resource's failure.
    ///
    /// Must be called within a tokio runtime context.
    pub async fn close_all_parallel(&mut self, resources: Vec<Resource>) {
        let handles: Vec<JoinHandle<Result<(), BoxError>>> = resources
            .into_iter()
            .map(|resource| tokio::spawn(resource.close()))
            .collect();

        for handle in handles {
            match handle.await {
                Ok(result) => self.shade.absorb(result),
                Err(join_err) => self.shade.absorb(Err(Box::new(join_err))),
            }
        }
    }

    /// [`close_all_parallel`](Self::close_all_parallel) for synchronous
    /// callers; runs its own independent blocking wait.
    ///
    /// Releases run concurrently when a tokio runtime context is reachable
    /// from the calling thread; otherwise there is nothing to spawn on and
    /// the resources are released sequentially, still exactly once each.
    pub fn close_all_parallel_blocking(&mut self, resources: Vec<Resource>) {
        match tokio::runtime::Handle::try_current() {
            Ok(_) => futures::executor::block_on(self.close_all_parallel(resources)),
            Err(_) => futures::executor::block_on(self.close_all(resources)),
        }
    }

    /// Whether no failure has been absorbed or seeded.
    pub fn is_clear(&self) -> bool {
        self.shade.is_clear()
    }

    /// Whether finishing now would report a synthesized aggregate.
    pub fn synthesized(&self) -> bool {
        self.shade.synthesized()
    }

    /// Reports the merged failure, if any.
    pub fn finish(self) -> Option<BoxError> {
        self.shade.finish()
    }
}

/// Releases resources sequentially in the given order, merging failures under
/// a [`MULTI_CLOSE_FAILURE`] aggregate (or under `existing`, which stays
/// primary when present).
///
/// Callers wanting LIFO semantics reverse their stack before calling; see
/// [`CloseStack`](crate::closer::stack::CloseStack) for the scoped version.
/// Returns `existing` unchanged when nothing new failed.
pub async fn close_all(
    resources: impl IntoIterator<Item = Resource>,
    existing: Option<BoxError>,
) -> Option<BoxError> {
    let mut shade = match existing {
        Some(primary) => Shade::with_primary(primary),
        None => Shade::synthetic(MULTI_CLOSE_FAILURE),
    };
    for resource in resources {
        shade.absorb(resource.close().await);
    }
    shade.finish()
}

/// [`close_all`] for synchronous callers.
pub fn close_all_blocking(
    resources: impl IntoIterator<Item = Resource>,
    existing: Option<BoxError>,
) -> Option<BoxError> {
    futures::executor::block_on(close_all(resources, existing))
}

/// Releases every resource under failure isolation, merging failures in
/// resource order under a [`MULTI_CLOSE_FAILURE`] aggregate.
///
/// Must be called within a tokio runtime context.
pub async fn close_all_parallel(resources: Vec<Resource>) -> Option<BoxError> {
    let mut shade = Shade::synthetic(MULTI_CLOSE_FAILURE);
    let handles: Vec<JoinHandle<Result<(), BoxError>>> = resources
        .into_iter()
        .map(|resource| tokio::spawn(resource.close()))
        .collect();
    for handle in handles {
        match handle.await {
            Ok(result) => shade.absorb(result),
            Err(join_err) => shade.absorb(Err(Box::new(join_err))),
        }
    }
    shade.finish()
}

/// Runs `block` against a synchronously closable resource, then releases it
/// unconditionally, exactly once.
///
/// - block fails with `E`, release fails with `F`: `E` propagates with `F` as
///   a subordinate;
/// - block succeeds but release fails with `F`: `F` propagates as primary.
pub fn with_sync<R, T, F>(mut resource: R, block: F) -> Result<T, BoxError>
where
    R: Closable,
    F: FnOnce(&mut R) -> Result<T, BoxError>,
{
    let block_result = block(&mut resource);
    let close_result = resource.close();
    seal(block_result, close_result)
}

/// [`with_sync`] for a suspending resource and block.
///
/// # Example
/// ```no_run
/// # use mooring::{with_async, AsyncClosable, BoxError};
/// # use futures::FutureExt;
/// # async fn demo<S: AsyncClosable>(session: S) -> Result<(), BoxError> {
/// let _rows = with_async(session, |_: &mut S| async { Ok(1) }.boxed()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn with_async<R, T, F>(mut resource: R, block: F) -> Result<T, BoxError>
where
    R: AsyncClosable,
    F: for<'a> FnOnce(&'a mut R) -> BoxFuture<'a, Result<T, BoxError>>,
{
    let block_result = block(&mut resource).await;
    let close_result = resource.close().await;
    seal(block_result, close_result)
}

fn seal<T>(block: Result<T, BoxError>, close: Result<(), BoxError>) -> Result<T, BoxError> {
    match (block, close) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(block_err), Ok(())) => Err(block_err),
        (Err(block_err), Err(close_err)) => {
            Err(Box::new(AggregateError::wrap(block_err, vec![close_err])))
        }
    }
}
