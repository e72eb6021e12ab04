//! # taskpool
//!
//! **taskpool** is a bounded-concurrency background-work pool for Rust.
//!
//! It accepts an unbounded stream of task submissions, runs at most N of
//! them concurrently in isolated execution units (OS processes or runtime
//! tasks), and exposes, per submitted task, a live, multicast,
//! replay-capable view of its lifecycle: queue position, running state,
//! and emitted messages.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Pool::submit(descriptor) ──► TaskHandle { state, messages, queue_position }
//!        │
//!        ▼ (submission mpsc)
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Coordinator (serialized loop, sole mutator)                  │
//! │  - FIFO queue: VecDeque<QueueEntry>                           │
//! │  - running set: HashMap<TaskId, RunningEntry>  (≤ max_workers)│
//! │  - Bus (broadcast pool events)                                │
//! └──────┬──────────────────────┬─────────────────────────┬───────┘
//!        ▼                      ▼                         ▼
//!   WorkerAdapter::spawn   WorkerAdapter::spawn      WorkerAdapter::spawn
//!        │                      │                         │
//!   execution unit         execution unit            execution unit
//!        │                      │                         │
//!        │  ready/data/error/exited  (signal mpsc)        │
//!        └──────────────────────┴─────────────────────────┘
//!                               │
//!                               ▼
//!              LifecycleChannel per task (replay-latest)
//!              state / messages / queue position projections
//! ```
//!
//! ### Lifecycle
//! ```text
//! Queued ─► Starting ─► Online ─► Exited     (normal)
//! Queued ─► Starting ─► Errored              (spawn or run failure)
//! ```
//!
//! ## Guarantees
//! - `|running| ≤ max_workers` at every instant; capacity is fixed at
//!   creation.
//! - Admission is strict FIFO by submission time; completion order is
//!   unconstrained.
//! - Queue positions are 1-indexed, recomputed after every enqueue or
//!   dequeue, and never repeat consecutively.
//! - Worker failures are scoped to the affected task's channel; they
//!   never abort the coordinator or other tasks. No automatic retry.
//! - Late subscribers immediately receive each projection's latest value
//!   (replay-on-subscribe), even after the task is terminal.
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference
//!   only)_.
//!
//! ## Example
//! ```rust
//! use taskpool::{Pool, PoolConfig, TaskDescriptor, TaskState, WorkError};
//! use taskpool::worker::FnAdapter;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let adapter = FnAdapter::new()
//!         .register("greet", |arg, messages| async move {
//!             messages.send(format!("hello, {arg}"));
//!             Ok::<_, WorkError>(0)
//!         })
//!         .arc();
//!
//!     let pool = Pool::new(PoolConfig::with_capacity(2), adapter);
//!     let handle = pool.submit(TaskDescriptor::new("greet", "world"));
//!
//!     let mut state = handle.state();
//!     while let Some(s) = state.recv().await {
//!         if s == TaskState::Exited {
//!             break;
//!         }
//!     }
//!
//!     let mut messages = handle.messages();
//!     assert_eq!(messages.recv().await.as_deref(), Some("hello, world"));
//!
//!     pool.shutdown().await;
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

pub mod worker;

// ---- Public re-exports ----

pub use config::PoolConfig;
pub use self::core::{Pool, PoolBuilder};
pub use error::{AdmissionError, SpawnError, WorkError};
pub use events::{Bus, Event, EventKind, LifecycleChannel, Projection, ProjectionReceiver};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{TaskDescriptor, TaskHandle, TaskId, TaskState};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
