//! # Secondary task dispatch.
//!
//! - [`core`](self::core) — the [`SecondaryDispatcher`] worker pool and its
//!   rejection/drain semantics;
//! - [`target`] — the [`DispatchTarget`] seam and the [`BlockingPool`]
//!   fallback;
//! - [`config`] — sizing knobs.

pub mod config;
pub mod core;
pub mod target;

pub use config::DispatcherConfig;
pub use core::{RejectReason, SecondaryDispatcher};
pub use target::{BlockingPool, DispatchTarget, Job};
