//! # Per-task lifecycle channel.
//!
//! Every submitted task owns one [`LifecycleChannel`]: three independent
//! multicast [`Projection`]s (state, messages, queue position), each
//! caching its latest value so a subscriber attaching after the fact
//! immediately receives that cached value before any newer ones.
//!
//! ## Architecture
//! ```text
//!                 ┌────────────────────────────────────────────┐
//!  coordinator ──►│ LifecycleChannel                           │
//!                 │   state     Projection<TaskState> (seeded) │──► subscribers
//!                 │   messages  Projection<String>             │──► subscribers
//!                 │   position  Projection<usize>   (distinct) │──► subscribers
//!                 └────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - **Replay-latest**: a new subscriber first receives the projection's
//!   cached value (if any), then live values.
//! - **Seeding**: the state projection starts at `Queued` without an
//!   explicit publish.
//! - **Distinct positions**: the queue-position projection suppresses
//!   consecutive duplicate values.
//! - **Terminal paths**: [`complete`](LifecycleChannel::complete) closes
//!   all projections after a normal `Exited`;
//!   [`fail`](LifecycleChannel::fail) publishes `Errored`, records the
//!   reason, and closes; `Exited` is never emitted on the error path.
//! - **Closed projections** accept no further values but keep serving the
//!   cached last value to new subscribers; live receivers drain buffered
//!   values and then observe end-of-stream (`recv() -> None`).
//! - **Lag**: a receiver that falls behind the projection buffer skips to
//!   the oldest retained value, like any broadcast receiver.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::tasks::TaskState;

/// Multicast stream of one lifecycle category with a last-value cache.
///
/// A thin pairing of `tokio::sync::broadcast` with a cached latest value,
/// which is what gives late subscribers replay-on-subscribe semantics.
pub struct Projection<T> {
    inner: Mutex<Inner<T>>,
}

struct Inner<T> {
    /// Latest accepted value; served first to every new subscriber.
    last: Option<T>,
    /// Live fan-out; `None` once the projection is closed.
    tx: Option<broadcast::Sender<T>>,
}

impl<T: Clone + Send + 'static> Projection<T> {
    /// Creates an empty projection with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            inner: Mutex::new(Inner {
                last: None,
                tx: Some(tx),
            }),
        }
    }

    /// Creates a projection whose cache is pre-seeded with `seed`.
    ///
    /// The seed behaves as if it had been published before any subscriber
    /// attached: it replays, but is never re-broadcast.
    pub fn with_seed(capacity: usize, seed: T) -> Self {
        let p = Self::new(capacity);
        p.inner.lock().expect("projection lock poisoned").last = Some(seed);
        p
    }

    /// Publishes a value: caches it and fans it out to live receivers.
    ///
    /// Ignored once the projection is closed.
    pub fn publish(&self, value: T) {
        let mut inner = self.inner.lock().expect("projection lock poisoned");
        let Some(tx) = inner.tx.as_ref() else {
            return;
        };
        // A send error only means there is no live receiver right now; the
        // cache still picks the value up for late subscribers.
        let _ = tx.send(value.clone());
        inner.last = Some(value);
    }

    /// Closes the projection: no further values are accepted, live
    /// receivers drain and end, and the cached value keeps replaying.
    pub fn close(&self) {
        let mut inner = self.inner.lock().expect("projection lock poisoned");
        inner.tx = None;
    }

    /// Latest accepted value, if any.
    pub fn last(&self) -> Option<T> {
        self.inner
            .lock()
            .expect("projection lock poisoned")
            .last
            .clone()
    }

    /// True once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner
            .lock()
            .expect("projection lock poisoned")
            .tx
            .is_none()
    }

    /// Creates a receiver that yields the cached value first, then live
    /// values.
    ///
    /// Subscription takes the same lock as [`publish`](Self::publish), so
    /// the replayed value and the live stream never miss or duplicate a
    /// value in between.
    pub fn subscribe(&self) -> ProjectionReceiver<T> {
        let inner = self.inner.lock().expect("projection lock poisoned");
        ProjectionReceiver {
            replay: inner.last.clone(),
            rx: inner.tx.as_ref().map(|tx| tx.subscribe()),
        }
    }
}

impl<T: Clone + Send + PartialEq + 'static> Projection<T> {
    /// Publishes a value unless it equals the cached latest one.
    ///
    /// Used by the queue-position projection: an unchanged rank is not
    /// re-emitted.
    pub fn publish_distinct(&self, value: T) {
        let mut inner = self.inner.lock().expect("projection lock poisoned");
        if inner.last.as_ref() == Some(&value) {
            return;
        }
        let Some(tx) = inner.tx.as_ref() else {
            return;
        };
        let _ = tx.send(value.clone());
        inner.last = Some(value);
    }
}

/// Receiving half of a [`Projection`] subscription.
///
/// `recv` yields the replayed cached value first (if the projection had
/// one at subscription time), then live values, and finally `None` once
/// the projection is closed and drained.
pub struct ProjectionReceiver<T> {
    replay: Option<T>,
    rx: Option<broadcast::Receiver<T>>,
}

impl<T: Clone> ProjectionReceiver<T> {
    /// Receives the next value, or `None` at end-of-stream.
    pub async fn recv(&mut self) -> Option<T> {
        if let Some(v) = self.replay.take() {
            return Some(v);
        }
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(v) => return Some(v),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    self.rx = None;
                    return None;
                }
            }
        }
    }

    /// Receives values until end-of-stream, returning the last one seen.
    pub async fn last(mut self) -> Option<T> {
        let mut last = None;
        while let Some(v) = self.recv().await {
            last = Some(v);
        }
        last
    }
}

/// The three lifecycle projections of one submitted task.
///
/// Created by [`Pool::submit`](crate::Pool::submit) with the state
/// projection seeded at [`TaskState::Queued`]. Mutated only by the
/// coordinator; callers observe it through the projection receivers on
/// their [`TaskHandle`](crate::TaskHandle).
pub struct LifecycleChannel {
    state: Projection<TaskState>,
    messages: Projection<String>,
    position: Projection<usize>,
    failure: Mutex<Option<Arc<str>>>,
}

impl LifecycleChannel {
    /// Creates a channel with all projections sized to `capacity`.
    pub(crate) fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            state: Projection::with_seed(capacity, TaskState::Queued),
            messages: Projection::new(capacity),
            position: Projection::new(capacity),
            failure: Mutex::new(None),
        })
    }

    /// Subscribes to the state projection.
    pub fn state(&self) -> ProjectionReceiver<TaskState> {
        self.state.subscribe()
    }

    /// Subscribes to the message projection.
    pub fn messages(&self) -> ProjectionReceiver<String> {
        self.messages.subscribe()
    }

    /// Subscribes to the queue-position projection.
    pub fn queue_position(&self) -> ProjectionReceiver<usize> {
        self.position.subscribe()
    }

    /// Latest state without subscribing.
    pub fn current_state(&self) -> TaskState {
        self.state.last().unwrap_or(TaskState::Queued)
    }

    /// Terminal failure reason, if the task errored.
    pub fn failure(&self) -> Option<Arc<str>> {
        self.failure.lock().expect("failure lock poisoned").clone()
    }

    /// Publishes a lifecycle state.
    pub(crate) fn set_state(&self, state: TaskState) {
        self.state.publish(state);
    }

    /// Publishes a worker message.
    pub(crate) fn push_message(&self, msg: String) {
        self.messages.publish(msg);
    }

    /// Publishes a 1-indexed queue position, suppressing consecutive
    /// duplicates.
    pub(crate) fn set_position(&self, position: usize) {
        self.position.publish_distinct(position);
    }

    /// Normal terminal path: closes all projections after `Exited`.
    pub(crate) fn complete(&self) {
        self.state.close();
        self.messages.close();
        self.position.close();
    }

    /// Error terminal path: records the reason, publishes `Errored`, and
    /// closes all projections. `Exited` is never emitted here.
    pub(crate) fn fail(&self, reason: impl Into<Arc<str>>) {
        {
            let mut failure = self.failure.lock().expect("failure lock poisoned");
            if failure.is_none() {
                *failure = Some(reason.into());
            }
        }
        self.state.publish(TaskState::Errored);
        self.complete();
    }

    /// Shutdown path for entries that never left the queue: records the
    /// reason and closes without publishing further states, so the state
    /// sequence stays a valid prefix.
    pub(crate) fn abandon(&self, reason: impl Into<Arc<str>>) {
        {
            let mut failure = self.failure.lock().expect("failure lock poisoned");
            if failure.is_none() {
                *failure = Some(reason.into());
            }
        }
        self.complete();
    }
}
