//! # Pool: the public facade.
//!
//! [`Pool`] accepts submissions and forwards them to the coordinator.
//! `submit` never blocks: it posts the new entry to the coordinator's
//! submission channel and returns the task's handle immediately, so a
//! caller can submit a whole batch back-to-back before the first
//! admission pass runs.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::PoolConfig;
use crate::events::{Bus, Event};
use crate::tasks::{QueueEntry, TaskDescriptor, TaskHandle};
use crate::worker::WorkerAdapter;

use super::builder::PoolBuilder;

/// Bounded-concurrency background-work pool.
///
/// Capacity is fixed at creation. Callers may run several independently
/// configured pools side by side (one per resource class); the pool has
/// no awareness of what a descriptor's work or argument represent.
///
/// Dropping the pool closes the submission channel; the coordinator then
/// stops and abandons whatever is still queued. Use
/// [`shutdown`](Pool::shutdown) to also wait for the teardown.
pub struct Pool {
    cfg: PoolConfig,
    submit_tx: mpsc::UnboundedSender<QueueEntry>,
    bus: Bus,
    token: CancellationToken,
    coordinator: JoinHandle<()>,
}

impl Pool {
    /// Creates a pool with the given configuration and worker adapter.
    ///
    /// Must be called from within a tokio runtime: the coordinator loop is
    /// spawned here.
    pub fn new(cfg: PoolConfig, adapter: Arc<dyn WorkerAdapter>) -> Self {
        Self::builder(cfg).with_adapter(adapter).build()
    }

    /// Starts building a pool; see [`PoolBuilder`].
    pub fn builder(cfg: PoolConfig) -> PoolBuilder {
        PoolBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: PoolConfig,
        submit_tx: mpsc::UnboundedSender<QueueEntry>,
        bus: Bus,
        token: CancellationToken,
        coordinator: JoinHandle<()>,
    ) -> Self {
        Self {
            cfg,
            submit_tx,
            bus,
            token,
            coordinator,
        }
    }

    /// Submits a descriptor and returns its lifecycle handle.
    ///
    /// Never blocks and never suspends. The entry's state projection is
    /// seeded at `Queued`; admission happens later on the coordinator
    /// task. If the coordinator is no longer running, the returned
    /// handle's channel is closed immediately with a recorded failure
    /// reason.
    pub fn submit(&self, descriptor: TaskDescriptor) -> TaskHandle {
        let entry = QueueEntry::new(descriptor, self.cfg.replay_capacity_clamped());
        let handle = entry.handle();

        if let Err(rejected) = self.submit_tx.send(entry) {
            rejected.0.channel.abandon("pool is shut down");
        }

        handle
    }

    /// Subscribes to pool-wide observability events.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// The pool's configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.cfg
    }

    /// Stops the coordinator and waits for it to abandon queued entries
    /// and tear down running workers.
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.coordinator.await;
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("max_workers", &self.cfg.max_workers)
            .finish()
    }
}
