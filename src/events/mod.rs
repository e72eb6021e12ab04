//! Events: per-task lifecycle channels and the pool-wide bus.
//!
//! ## Contents
//! - [`LifecycleChannel`], [`Projection`], [`ProjectionReceiver`] — the
//!   per-task multicast, replay-latest streams
//! - [`EventKind`], [`Event`] — pool-wide event classification and payload
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: the coordinator (sole mutator of lifecycle channels).
//! - **Consumers**: task handles (per-task projections) and observers
//!   (bus receivers, subscriber set).

mod bus;
mod channel;
mod event;

pub use bus::Bus;
pub use channel::{LifecycleChannel, Projection, ProjectionReceiver};
pub use event::{Event, EventKind};
