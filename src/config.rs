//! # Pool configuration.
//!
//! [`PoolConfig`] defines the pool's behavior: the concurrency cap, the
//! capacity of the pool-wide event bus, and the buffer size of the per-task
//! replay projections.
//!
//! # Example
//! ```
//! use taskpool::PoolConfig;
//!
//! let mut cfg = PoolConfig::default();
//! cfg.max_workers = 4;
//!
//! assert_eq!(cfg.max_workers, 4);
//! ```

/// Configuration for a [`Pool`](crate::Pool).
///
/// Capacity is fixed for the pool's lifetime; there is no resizing after
/// creation.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum number of workers running concurrently (clamped to >= 1).
    pub max_workers: usize,
    /// Capacity of the pool-wide event bus channel.
    pub bus_capacity: usize,
    /// Buffer capacity of each per-task projection (state, messages,
    /// queue position). Receivers that fall further behind than this skip
    /// to the oldest retained value.
    pub replay_capacity: usize,
}

impl PoolConfig {
    /// Creates a configuration with the given concurrency cap and defaults
    /// for everything else.
    pub fn with_capacity(max_workers: usize) -> Self {
        Self {
            max_workers,
            ..Self::default()
        }
    }

    /// Concurrency cap clamped to the minimum of 1.
    pub(crate) fn workers_clamped(&self) -> usize {
        self.max_workers.max(1)
    }

    /// Bus capacity clamped to the minimum of 1.
    pub(crate) fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Projection buffer capacity clamped to the minimum of 1.
    pub(crate) fn replay_capacity_clamped(&self) -> usize {
        self.replay_capacity.max(1)
    }
}

impl Default for PoolConfig {
    /// Provides a default configuration:
    /// - `max_workers = 1`
    /// - `bus_capacity = 1024`
    /// - `replay_capacity = 64`
    fn default() -> Self {
        Self {
            max_workers: 1,
            bus_capacity: 1024,
            replay_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = PoolConfig::default();
        assert_eq!(cfg.max_workers, 1);
        assert_eq!(cfg.bus_capacity, 1024);
        assert_eq!(cfg.replay_capacity, 64);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cfg = PoolConfig::with_capacity(0);
        assert_eq!(cfg.workers_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
    }
}
