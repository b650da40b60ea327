//! Store configuration.

use std::time::Duration;

/// Tuning knobs for the mutable store and its scratch buffer pool.
///
/// The defaults are sensible for interactive workloads; bulk loaders
/// typically raise `initial_capacity` to skip the early growth steps.
///
/// ```
/// use conceptdb_core::Config;
///
/// let config = Config::new()
///     .initial_capacity(1 << 16)
///     .pool_max_idle(16);
/// assert_eq!(config.initial_capacity, 1 << 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Initial capacity of the concept table, in concepts.
    pub initial_capacity: usize,
    /// Scratch buffers kept around between borrows.
    pub pool_max_idle: usize,
    /// Hard ceiling on live scratch buffers, borrowed included.
    pub pool_max_total: usize,
    /// How long a borrow waits for a buffer before falling back to an
    /// untracked allocation.
    pub pool_borrow_timeout: Duration,
}

impl Config {
    /// Creates a configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_capacity: 1024,
            pool_max_idle: 10,
            pool_max_total: 20,
            pool_borrow_timeout: Duration::from_secs(1),
        }
    }

    /// Sets the initial capacity of the concept table.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets how many idle scratch buffers the pool retains.
    #[must_use]
    pub const fn pool_max_idle(mut self, max_idle: usize) -> Self {
        self.pool_max_idle = max_idle;
        self
    }

    /// Sets the ceiling on live scratch buffers.
    #[must_use]
    pub const fn pool_max_total(mut self, max_total: usize) -> Self {
        self.pool_max_total = max_total;
        self
    }

    /// Sets the borrow timeout of the scratch buffer pool.
    #[must_use]
    pub const fn pool_borrow_timeout(mut self, timeout: Duration) -> Self {
        self.pool_borrow_timeout = timeout;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.initial_capacity, 1024);
        assert_eq!(config.pool_max_idle, 10);
        assert_eq!(config.pool_max_total, 20);
        assert_eq!(config.pool_borrow_timeout, Duration::from_secs(1));
    }

    #[test]
    fn builder_chains() {
        let config = Config::new()
            .initial_capacity(4096)
            .pool_max_idle(2)
            .pool_max_total(4)
            .pool_borrow_timeout(Duration::from_millis(50));
        assert_eq!(config.initial_capacity, 4096);
        assert_eq!(config.pool_max_total, 4);
    }
}
