//! # Structured resource teardown.
//!
//! Everything needed to release a group of resources exactly once each and
//! walk away with at most one (fully detailed) error:
//!
//! - [`resource`] — the [`Closable`]/[`AsyncClosable`] capabilities and the
//!   [`Resource`] tagged registration;
//! - [`context`] — the [`Closer`] closing context, sequential and
//!   failure-isolated parallel multi-close, and `use`-style helpers;
//! - [`stack`] — the scoped [`CloseStack`] with LIFO teardown and the
//!   [`guard_start`] startup guard.

pub mod context;
pub mod resource;
pub mod stack;

pub use context::{
    close_all, close_all_blocking, close_all_parallel, with_async, with_sync, Closer,
    CLOSE_CONTEXT_FAILURE, MULTI_CLOSE_FAILURE,
};
pub use resource::{AsyncClosable, Closable, Resource};
pub use stack::{guard_start, CloseStack};
