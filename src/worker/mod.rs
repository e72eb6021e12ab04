//! # Worker adapters.
//!
//! - [`WorkerAdapter`] - the spawn seam (object-safe async trait)
//! - [`SignalSink`] / [`WorkerSignal`] - worker→coordinator signals
//! - [`WorkerHandle`] - handle to a live execution unit
//! - [`ProcessAdapter`] - OS-process execution units
//! - [`FnAdapter`] - named async closures on the runtime

mod adapter;
mod func;
mod process;

pub use adapter::{SignalSink, WorkerAdapter, WorkerHandle, WorkerSignal};
pub use func::{FnAdapter, MessageSender};
pub use process::ProcessAdapter;

pub(crate) use adapter::Signal;
