//! # Reader-writer lock composed from exclusive primitives.
//!
//! [`ReadWriteMutex`] assumes no native reader-writer primitive: it is built
//! from an exclusive write-side lock (a binary [`Semaphore`], which is the one
//! tokio exclusive lock that supports manual release) plus a private reader
//! count guarded by a state [`Mutex`].
//!
//! Readers may overlap with readers but never with a writer; a writer excludes
//! everyone. The first reader acquires the write side on behalf of all current
//! readers, and the last reader releases it. All counter mutations and the
//! accompanying write-side handoff happen while the state lock is held.
//!
//! There is no fairness guarantee in either direction: a continuous stream of
//! overlapping readers can starve a waiting writer. That trade-off buys O(1)
//! bookkeeping. Introspection (is-locked, try-lock, holder checks) is not part
//! of the contract; supporting it correctly would require a different state
//! machine.
//!
//! # Example
//! ```
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! use mooring::ReadWriteMutex;
//!
//! let lock = ReadWriteMutex::new();
//! lock.lock_read().await;
//! lock.lock_read().await; // readers overlap
//! lock.unlock_read().await;
//! lock.unlock_read().await;
//!
//! lock.lock_write().await; // exclusive
//! lock.unlock_write();
//! # });
//! ```

use tokio::sync::{Mutex, Semaphore};

/// Reader-concurrent, writer-exclusive lock built from two exclusive locks
/// and a guarded reader count.
///
/// Lock and unlock are explicit calls, not guards: the write side is held
/// "on behalf of all current readers" across arbitrarily many reader
/// lifetimes, which guard-based ownership cannot express.
#[derive(Debug)]
pub struct ReadWriteMutex {
    /// Write-exclusion lock: a binary semaphore used as a manually released
    /// exclusive lock.
    write: Semaphore,
    /// Reader count; mutated only while this mutex is held.
    state: Mutex<usize>,
}

impl Default for ReadWriteMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadWriteMutex {
    /// Creates an unlocked lock.
    pub fn new() -> Self {
        Self {
            write: Semaphore::new(1),
            state: Mutex::new(0),
        }
    }

    /// Acquires the read side, waiting out any active writer.
    ///
    /// The first reader (0 → 1) also acquires the write side on behalf of all
    /// current readers; while it waits, later readers queue on the state lock.
    pub async fn lock_read(&self) {
        let mut readers = self.state.lock().await;
        if *readers == 0 {
            self.acquire_write_side().await;
        }
        *readers += 1;
    }

    /// Releases the read side.
    ///
    /// The last reader (1 → 0) releases the write side.
    ///
    /// # Panics
    /// Panics if the read side is released more times than it was acquired;
    /// that is a caller bug the lock refuses to absorb quietly.
    pub async fn unlock_read(&self) {
        let mut readers = self.state.lock().await;
        *readers = readers
            .checked_sub(1)
            .expect("read side released without a matching acquire");
        if *readers == 0 {
            self.write.add_permits(1);
        }
    }

    /// Acquires the write side, excluding readers and other writers.
    pub async fn lock_write(&self) {
        self.acquire_write_side().await;
    }

    /// Releases the write side.
    ///
    /// Must pair with a prior [`lock_write`](Self::lock_write); the lock has
    /// no way to detect an unmatched release on this path.
    pub fn unlock_write(&self) {
        self.write.add_permits(1);
    }

    async fn acquire_write_side(&self) {
        match self.write.acquire().await {
            Ok(permit) => permit.forget(),
            // The semaphore is owned by this struct and never closed.
            Err(_) => unreachable!("write-side semaphore closed"),
        }
    }
}
