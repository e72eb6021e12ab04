//! Pool construction and wiring.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::PoolConfig;
use crate::events::Bus;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::worker::{ProcessAdapter, WorkerAdapter};

use super::coordinator::Coordinator;
use super::pool::Pool;

/// Builder for constructing a [`Pool`] with optional observers.
///
/// # Example
/// ```no_run
/// use taskpool::{Pool, PoolConfig, WorkError};
/// use taskpool::worker::FnAdapter;
///
/// # async fn demo() {
/// let adapter = FnAdapter::new()
///     .register("noop", |_, _| async { Ok::<_, WorkError>(0) })
///     .arc();
///
/// let pool = Pool::builder(PoolConfig::with_capacity(4))
///     .with_adapter(adapter)
///     .build();
/// # }
/// ```
pub struct PoolBuilder {
    cfg: PoolConfig,
    adapter: Option<Arc<dyn WorkerAdapter>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl PoolBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: PoolConfig) -> Self {
        Self {
            cfg,
            adapter: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the worker adapter. Defaults to
    /// [`ProcessAdapter`](crate::worker::ProcessAdapter).
    pub fn with_adapter(mut self, adapter: Arc<dyn WorkerAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive pool events (submissions, admissions, worker
    /// lifecycle) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the pool: wires the bus, spawns the subscriber listener (if
    /// any subscribers were added) and the coordinator loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Pool {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let token = CancellationToken::new();

        if !self.subscribers.is_empty() {
            spawn_listener(&bus, SubscriberSet::new(self.subscribers), token.clone());
        }

        let adapter = self
            .adapter
            .unwrap_or_else(|| Arc::new(ProcessAdapter::new()));
        let (coordinator, submit_tx) = Coordinator::new(self.cfg.clone(), adapter, bus.clone());
        let join = tokio::spawn(coordinator.run(token.clone()));

        Pool::new_internal(self.cfg, submit_tx, bus, token, join)
    }
}

/// Forwards bus events to the subscriber set until shutdown.
fn spawn_listener(bus: &Bus, set: SubscriberSet, token: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                ev = rx.recv() => match ev {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
        set.shutdown().await;
    });
}
