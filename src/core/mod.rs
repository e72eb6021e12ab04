//! Pool core: the public facade and the serialized admission loop.
//!
//! Internal modules:
//! - [`coordinator`]: owns the queue/running set, admits FIFO up to the
//!   cap, applies worker signals;
//! - [`builder`]: wires bus, subscribers, and the coordinator task;
//! - [`pool`]: the `Pool` facade returned to callers.

mod builder;
mod coordinator;
mod pool;

pub use builder::PoolBuilder;
pub use pool::Pool;
