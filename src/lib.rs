//! # mooring
//!
//! **Mooring** is a set of low-level concurrency primitives and
//! resource-lifecycle utilities for embedding in larger tokio-based systems.
//! It is a building block, not a framework: no scheduler of its own, no
//! persistence, no wire protocol.
//!
//! ## Architecture
//! ```text
//!  ┌────────────────────┐   ┌──────────────────────┐   ┌─────────────────┐
//!  │ SecondaryDispatcher │   │  Structured closer   │   │ ReadWriteMutex  │
//!  │  queue + workers    │   │  Closer / CloseStack │   │  two exclusive  │
//!  │  rejection→fallback │   │  sequential/parallel │   │  locks + count  │
//!  └───────┬─────────────┘   └──────────┬───────────┘   └─────────────────┘
//!          │ invariant violation        │ release failures
//!          ▼                            ▼
//!     FatalHook (abort)        Shade ──► AggregateError
//! ```
//!
//! Three independent pieces share two small foundations:
//!
//! - [`SecondaryDispatcher`] offloads work items onto a fixed worker pool
//!   behind a FIFO queue. Work that cannot be enqueued — or that is still
//!   queued when the dispatcher's scope is cancelled — is never lost: its
//!   context is cancelled and the item is redirected to a fallback
//!   [`DispatchTarget`].
//! - The closer machinery ([`Closer`], [`CloseStack`], [`close_all`],
//!   [`with_sync`]/[`with_async`]) releases every registered resource exactly
//!   once and merges all failures into a single [`AggregateError`] whose
//!   subordinates stay visible for diagnosis. Parallel teardown is
//!   failure-isolated: one resource's failure never cancels a sibling's
//!   release.
//! - [`ReadWriteMutex`] composes reader-concurrent / writer-exclusive
//!   semantics from two exclusive locks and a guarded reader count.
//!
//! Foundations: [`Once`] (atomic run-at-most-once gate) and [`FatalHook`]
//! (injected sink for unrecoverable internal failures).
//!
//! ## Example
//! ```no_run
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! use mooring::{DispatcherConfig, SecondaryDispatcher};
//! use tokio_util::sync::CancellationToken;
//!
//! let scope = CancellationToken::new();
//! let dispatcher =
//!     SecondaryDispatcher::with_defaults(DispatcherConfig::default(), scope.clone());
//!
//! dispatcher
//!     .submit(CancellationToken::new(), Box::new(|| println!("offloaded")))
//!     .await;
//!
//! dispatcher.shutdown().await;
//! dispatcher.join().await;
//! # });
//! ```

pub mod closer;
pub mod dispatcher;
pub mod error;
pub mod fatal;
pub mod once;
pub mod rwlock;

pub use closer::{
    close_all, close_all_blocking, close_all_parallel, guard_start, with_async, with_sync,
    AsyncClosable, Closable, CloseStack, Closer, Resource, CLOSE_CONTEXT_FAILURE,
    MULTI_CLOSE_FAILURE,
};
pub use dispatcher::{
    BlockingPool, DispatchTarget, DispatcherConfig, Job, RejectReason, SecondaryDispatcher,
};
pub use error::{AggregateError, BoxError, Shade};
pub use fatal::{Abort, FatalHook};
pub use once::Once;
pub use rwlock::ReadWriteMutex;
