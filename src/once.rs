//! # Run-at-most-once helper.
//!
//! [`Once`] is a flag-guarded single-run gate: an explicit `Pending -> Executed`
//! state machine backed by an atomic compare-exchange. Unlike
//! [`std::sync::Once`] it never blocks a loser — a caller that loses the race
//! simply skips the closure, which is what queue-drain guards want.

use std::sync::atomic::{AtomicBool, Ordering};

/// Atomic single-run gate.
///
/// # Example
/// ```
/// use mooring::Once;
///
/// let once = Once::new();
/// let mut runs = 0;
/// assert!(once.run(|| runs += 1));
/// assert!(!once.run(|| runs += 1));
/// assert_eq!(runs, 1);
/// assert!(once.has_run());
/// ```
#[derive(Debug, Default)]
pub struct Once {
    executed: AtomicBool,
}

impl Once {
    /// Creates a gate in the `Pending` state.
    pub const fn new() -> Self {
        Self {
            executed: AtomicBool::new(false),
        }
    }

    /// Runs `f` iff this is the first call to win the `Pending -> Executed`
    /// transition. Returns whether `f` ran.
    pub fn run<F: FnOnce()>(&self, f: F) -> bool {
        let won = self
            .executed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            f();
        }
        won
    }

    /// Whether the transition has already happened.
    pub fn has_run(&self) -> bool {
        self.executed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_runs_exactly_once() {
        let once = Once::new();
        assert!(!once.has_run());
        assert!(once.run(|| {}));
        assert!(once.has_run());
        assert!(!once.run(|| panic!("second run")));
    }

    #[test]
    fn test_concurrent_callers_single_winner() {
        let once = Arc::new(Once::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let once = once.clone();
                let runs = runs.clone();
                std::thread::spawn(move || {
                    once.run(|| {
                        runs.fetch_add(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
