//! # Scoped resource stack.
//!
//! [`CloseStack`] collects resources as they are acquired and releases them in
//! strict reverse-registration order at scope exit, merging failures the same
//! way [`close_all`](crate::closer::context::close_all) does. The stack is
//! owned by the scope that created it and is never shared.
//!
//! [`guard_start`] covers the "acquire several resources, bail out cleanly if
//! any step fails" startup pattern: on failure the partially built stack is
//! torn down and release failures ride along as subordinates of the step's
//! error.

use futures::future::BoxFuture;

use crate::closer::context::close_all;
use crate::closer::resource::{AsyncClosable, Closable, Resource};
use crate::error::BoxError;

/// Ordered stack of registered resources, released LIFO.
///
/// # Example
/// ```
/// # async fn scope_exit(listener: mooring::Resource, pool: mooring::Resource) {
/// use mooring::CloseStack;
///
/// let mut stack = CloseStack::new();
/// stack.push(listener);
/// stack.push(pool);
/// // pool is released first, listener last
/// if let Some(err) = stack.close().await {
///     eprintln!("teardown failed: {err}");
/// }
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CloseStack {
    stack: Vec<Resource>,
}

impl CloseStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource; it will be released before everything pushed
    /// earlier.
    pub fn push(&mut self, resource: Resource) {
        self.stack.push(resource);
    }

    /// Registers a synchronously closable resource.
    pub fn push_sync(&mut self, resource: impl Closable + 'static) {
        self.push(Resource::sync(resource));
    }

    /// Registers an asynchronously closable resource.
    pub fn push_async(&mut self, resource: impl AsyncClosable + 'static) {
        self.push(Resource::asynchronous(resource));
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Releases every resource in reverse registration order.
    pub async fn close(self) -> Option<BoxError> {
        self.close_with(None).await
    }

    /// Releases every resource in reverse registration order, attaching
    /// failures to `existing` when present.
    pub async fn close_with(mut self, existing: Option<BoxError>) -> Option<BoxError> {
        self.stack.reverse();
        close_all(self.stack, existing).await
    }

    /// Tears the stack down after `failure`; the failure stays primary and
    /// release failures become subordinates.
    pub async fn close_after(self, failure: BoxError) -> BoxError {
        match self.close_with(Some(failure)).await {
            Some(err) => err,
            // close_with always reports a provided existing failure.
            None => unreachable!("existing failure dropped during teardown"),
        }
    }

    /// [`close`](Self::close) for synchronous callers.
    pub fn close_blocking(self) -> Option<BoxError> {
        futures::executor::block_on(self.close())
    }
}

/// Runs a startup block that acquires resources into a fresh [`CloseStack`].
///
/// On success the value and the stack are handed back to the caller, which
/// owns teardown from then on. On failure the partially built stack is closed
/// in reverse order and the block's error propagates with any release
/// failures attached as subordinates.
pub async fn guard_start<T, F>(block: F) -> Result<(T, CloseStack), BoxError>
where
    F: for<'a> FnOnce(&'a mut CloseStack) -> BoxFuture<'a, Result<T, BoxError>>,
{
    let mut stack = CloseStack::new();
    match block(&mut stack).await {
        Ok(value) => Ok((value, stack)),
        Err(err) => Err(stack.close_after(err).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AggregateError;
    use futures::FutureExt;
    use std::sync::{Arc, Mutex};

    /// Appends its name to a shared log on close.
    struct Tracer {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    impl Closable for Tracer {
        fn close(&mut self) -> Result<(), BoxError> {
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                Err(BoxError::from(self.name.to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn tracer(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>, fail: bool) -> Tracer {
        Tracer {
            name,
            log: log.clone(),
            fail,
        }
    }

    #[tokio::test]
    async fn test_teardown_is_reverse_of_registration() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut stack = CloseStack::new();
        stack.push_sync(tracer("a", &log, false));
        stack.push_sync(tracer("b", &log, false));
        stack.push_sync(tracer("c", &log, false));
        assert_eq!(stack.len(), 3);

        assert!(stack.close().await.is_none());
        assert_eq!(*log.lock().unwrap(), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_failures_aggregate_in_release_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut stack = CloseStack::new();
        stack.push_sync(tracer("a", &log, true));
        stack.push_sync(tracer("b", &log, false));
        stack.push_sync(tracer("c", &log, true));

        let err = stack.close().await.unwrap();
        let agg = err.downcast_ref::<AggregateError>().unwrap();
        assert!(agg.is_synthesized());
        let subs: Vec<String> = agg.suppressed().iter().map(|e| e.to_string()).collect();
        // Release order is c, b, a; b succeeds.
        assert_eq!(subs, vec!["c", "a"]);
    }

    #[test]
    fn test_close_blocking_releases_in_reverse_without_runtime() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut stack = CloseStack::new();
        stack.push_sync(tracer("a", &log, false));
        stack.push_sync(tracer("b", &log, true));
        stack.push_sync(tracer("c", &log, false));

        let err = stack.close_blocking().unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["c", "b", "a"]);
        let agg = err.downcast_ref::<AggregateError>().unwrap();
        assert_eq!(agg.suppressed().len(), 1);
        assert_eq!(agg.suppressed()[0].to_string(), "b");
    }

    #[tokio::test]
    async fn test_guard_start_success_hands_stack_back() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (value, stack) = guard_start(|stack: &mut CloseStack| {
            let log = log.clone();
            async move {
                stack.push_sync(tracer("a", &log, false));
                stack.push_sync(tracer("b", &log, false));
                Ok(99)
            }
            .boxed()
        })
        .await
        .unwrap();

        assert_eq!(value, 99);
        assert_eq!(stack.len(), 2);
        // Nothing released yet.
        assert!(log.lock().unwrap().is_empty());
        assert!(stack.close().await.is_none());
        assert_eq!(*log.lock().unwrap(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_guard_start_failure_unwinds_acquired_resources() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let result: Result<((), CloseStack), BoxError> = guard_start(|stack: &mut CloseStack| {
            let log = log.clone();
            async move {
                stack.push_sync(tracer("a", &log, false));
                stack.push_sync(tracer("b", &log, true));
                Err(BoxError::from("startup step failed".to_string()))
            }
            .boxed()
        })
        .await;

        let err = result.unwrap_err();
        // Both acquired resources were released, most recent first.
        assert_eq!(*log.lock().unwrap(), vec!["b", "a"]);
        let agg = err.downcast_ref::<AggregateError>().unwrap();
        assert_eq!(
            agg.primary().unwrap().to_string(),
            "startup step failed"
        );
        assert_eq!(agg.suppressed().len(), 1);
        assert_eq!(agg.suppressed()[0].to_string(), "b");
    }
}
