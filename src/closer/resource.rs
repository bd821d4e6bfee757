//! # Closable-resource capabilities.
//!
//! A resource declares, at registration time, which release capability it
//! implements: [`Closable`] (release completes before returning) or
//! [`AsyncClosable`] (release may suspend). The closer machinery works over
//! the [`Resource`] tagged variant and always invokes the declared capability
//! — it never probes an object for an optional one.

use async_trait::async_trait;

use crate::error::BoxError;

/// Resource with a synchronous release operation.
///
/// `close` is called exactly once per registration; implementations are not
/// retried and need not be idempotent.
pub trait Closable: Send {
    /// Releases the resource.
    fn close(&mut self) -> Result<(), BoxError>;
}

/// Resource whose release operation may suspend.
#[async_trait]
pub trait AsyncClosable: Send {
    /// Releases the resource.
    async fn close(&mut self) -> Result<(), BoxError>;

    /// Releases the resource from synchronous code.
    ///
    /// Runs its own independent blocking wait; callers on a runtime worker
    /// thread should prefer [`close`](Self::close).
    fn close_blocking(&mut self) -> Result<(), BoxError> {
        futures::executor::block_on(self.close())
    }
}

/// A registered resource, tagged with the release capability it declared.
pub enum Resource {
    /// Synchronous release.
    Sync(Box<dyn Closable>),
    /// Suspending release.
    Async(Box<dyn AsyncClosable>),
}

impl Resource {
    /// Registers a synchronously closable resource.
    pub fn sync(resource: impl Closable + 'static) -> Self {
        Resource::Sync(Box::new(resource))
    }

    /// Registers an asynchronously closable resource.
    pub fn asynchronous(resource: impl AsyncClosable + 'static) -> Self {
        Resource::Async(Box::new(resource))
    }

    /// Releases the resource, consuming the registration.
    pub async fn close(self) -> Result<(), BoxError> {
        match self {
            Resource::Sync(mut r) => r.close(),
            Resource::Async(mut r) => r.close().await,
        }
    }

    /// Releases the resource from synchronous code, with an independent
    /// blocking wait for the suspending variant.
    pub fn close_blocking(self) -> Result<(), BoxError> {
        match self {
            Resource::Sync(mut r) => r.close(),
            Resource::Async(mut r) => r.close_blocking(),
        }
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Sync(_) => f.write_str("Resource::Sync"),
            Resource::Async(_) => f.write_str("Resource::Async"),
        }
    }
}
