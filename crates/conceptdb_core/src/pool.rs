//! Pooled scratch bins for frequency aggregation.
//!
//! Facet queries need a dense `i32` bin per assigned id. Allocating and
//! zeroing that array per query dominates small scans, so a bounded pool
//! recycles the buffers. Borrowing blocks up to the configured timeout
//! when the pool is at capacity and then degrades to an untracked
//! allocation; returning is handled by the guard's `Drop` on every exit
//! path, so a return can never be missed or fail.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::warn;

use crate::config::Config;

#[derive(Debug)]
struct PoolState {
    idle: Vec<Vec<i32>>,
    live: usize,
}

#[derive(Debug)]
struct PoolInner {
    state: Mutex<PoolState>,
    available: Condvar,
    max_idle: usize,
    max_total: usize,
    borrow_timeout: Duration,
}

/// A bounded pool of zeroed `i32` scratch buffers.
///
/// Clones share the same pool.
#[derive(Debug, Clone)]
pub struct BinPool {
    inner: Arc<PoolInner>,
}

impl BinPool {
    /// Creates a pool with the limits from `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                state: Mutex::new(PoolState {
                    idle: Vec::new(),
                    live: 0,
                }),
                available: Condvar::new(),
                max_idle: config.pool_max_idle,
                max_total: config.pool_max_total,
                borrow_timeout: config.pool_borrow_timeout,
            }),
        }
    }

    /// Borrows a zeroed buffer of `len` bins.
    ///
    /// Waits up to the configured timeout when the pool is exhausted,
    /// then falls back to an allocation the pool does not track.
    #[must_use]
    pub fn borrow(&self, len: usize) -> ScratchBins {
        let mut state = self.inner.state.lock();
        loop {
            if let Some(mut bins) = state.idle.pop() {
                state.live += 1;
                bins.clear();
                bins.resize(len, 0);
                return ScratchBins {
                    bins,
                    pool: Some(Arc::clone(&self.inner)),
                };
            }
            if state.live < self.inner.max_total {
                state.live += 1;
                return ScratchBins {
                    bins: vec![0; len],
                    pool: Some(Arc::clone(&self.inner)),
                };
            }
            let timed_out = self
                .inner
                .available
                .wait_for(&mut state, self.inner.borrow_timeout)
                .timed_out();
            if timed_out {
                drop(state);
                warn!(len, "scratch bin pool exhausted, using untracked allocation");
                return ScratchBins {
                    bins: vec![0; len],
                    pool: None,
                };
            }
        }
    }

    /// Buffers currently idle in the pool.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.inner.state.lock().idle.len()
    }
}

/// A borrowed bin buffer, returned to its pool on drop.
#[derive(Debug)]
pub struct ScratchBins {
    bins: Vec<i32>,
    pool: Option<Arc<PoolInner>>,
}

impl Deref for ScratchBins {
    type Target = [i32];

    fn deref(&self) -> &[i32] {
        &self.bins
    }
}

impl DerefMut for ScratchBins {
    fn deref_mut(&mut self) -> &mut [i32] {
        &mut self.bins
    }
}

impl Drop for ScratchBins {
    fn drop(&mut self) {
        let Some(pool) = self.pool.take() else {
            return;
        };
        let mut bins = std::mem::take(&mut self.bins);
        let mut state = pool.state.lock();
        state.live -= 1;
        if state.idle.len() < pool.max_idle {
            bins.fill(0);
            state.idle.push(bins);
        }
        drop(state);
        pool.available.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_pool(max_total: usize, timeout_ms: u64) -> BinPool {
        BinPool::new(
            &Config::new()
                .pool_max_idle(2)
                .pool_max_total(max_total)
                .pool_borrow_timeout(Duration::from_millis(timeout_ms)),
        )
    }

    #[test]
    fn borrowed_bins_are_zeroed_and_sized() {
        let pool = small_pool(2, 10);
        let bins = pool.borrow(16);
        assert_eq!(bins.len(), 16);
        assert!(bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn dropped_bins_come_back_clean() {
        let pool = small_pool(2, 10);
        {
            let mut bins = pool.borrow(8);
            bins[3] = 99;
        }
        assert_eq!(pool.idle_count(), 1);
        let bins = pool.borrow(8);
        assert_eq!(bins[3], 0);
    }

    #[test]
    fn reused_buffer_resizes_to_request() {
        let pool = small_pool(2, 10);
        drop(pool.borrow(4));
        let bins = pool.borrow(32);
        assert_eq!(bins.len(), 32);
        assert!(bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn exhausted_pool_falls_back_after_timeout() {
        let pool = small_pool(1, 5);
        let held = pool.borrow(4);
        // Pool is at max_total; this borrow times out and allocates ad hoc.
        let fallback = pool.borrow(4);
        assert_eq!(fallback.len(), 4);
        drop(fallback);
        // The untracked buffer did not corrupt the live count.
        drop(held);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn idle_buffers_are_bounded() {
        let pool = small_pool(8, 10);
        let all: Vec<ScratchBins> = (0..5).map(|_| pool.borrow(4)).collect();
        drop(all);
        assert_eq!(pool.idle_count(), 2);
    }
}
