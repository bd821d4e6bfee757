//! # Fatal-abort collaborator.
//!
//! Internal invariant violations (a worker job panicking, for example) are not
//! recoverable and must never be silently swallowed. Components that can
//! observe them take an injected [`FatalHook`] and route the error there after
//! diagnostic capture; the hook is expected to report and terminate, never
//! return.
//!
//! Keeping the hook injected (rather than calling `abort` directly) lets tests
//! substitute a stub that records the error and diverges by panicking.

use std::any::Any;

use crate::error::BoxError;

/// Sink for unrecoverable internal failures.
///
/// Implementations must diverge: log/report the error, then terminate (or, in
/// tests, panic).
pub trait FatalHook: Send + Sync {
    /// Reports `error` and never returns.
    fn fatal(&self, error: BoxError) -> !;
}

/// Default hook: writes the error chain to `tracing` and stderr, then aborts
/// the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct Abort;

impl FatalHook for Abort {
    fn fatal(&self, error: BoxError) -> ! {
        tracing::error!(%error, "unrecoverable internal failure, aborting");
        eprintln!("fatal: unrecoverable internal failure: {error}");
        let mut source = error.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::abort();
    }
}

/// Error wrapping a captured panic payload.
#[derive(Debug, thiserror::Error)]
#[error("worker job panicked: {0}")]
pub struct JobPanic(pub String);

/// Extracts a printable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_str_and_string() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new("owned".to_string());
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn Any + Send> = Box::new(17_u32);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }

    #[test]
    fn test_job_panic_display() {
        let err = JobPanic("boom".to_string());
        assert_eq!(err.to_string(), "worker job panicked: boom");
    }
}
