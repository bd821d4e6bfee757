//! # Dispatcher configuration.

/// Sizing knobs for a [`SecondaryDispatcher`](crate::dispatcher::SecondaryDispatcher).
///
/// # Example
/// ```
/// use mooring::DispatcherConfig;
///
/// let mut cfg = DispatcherConfig::default();
/// cfg.workers = 4;
///
/// assert_eq!(cfg.workers, 4);
/// assert_eq!(cfg.queue_capacity, 64);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct DispatcherConfig {
    /// Number of worker tasks draining the queue. Clamped to at least 1.
    pub workers: usize,
    /// Capacity of the dispatch queue. Clamped to at least 1; submissions
    /// wait while the queue is full.
    pub queue_capacity: usize,
}

impl Default for DispatcherConfig {
    /// Provides a default configuration:
    /// - `workers = 1`
    /// - `queue_capacity = 64`
    fn default() -> Self {
        Self {
            workers: 1,
            queue_capacity: 64,
        }
    }
}
