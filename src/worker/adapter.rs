//! # Worker adapter: the spawn seam.
//!
//! [`WorkerAdapter`] abstracts "start one isolated execution unit for this
//! descriptor". The coordinator hands each spawn a [`SignalSink`]; the
//! adapter (or the unit it started) reports progress through it with four
//! signal kinds, which the coordinator applies to the entry's lifecycle
//! channel:
//!
//! ```text
//! sink.ready()       ──► state Online
//! sink.data(payload) ──► message payload
//! sink.error(err)    ──► channel fails (Errored, never Exited)
//! sink.exited(code)  ──► state Exited, then channel completes
//! ```
//!
//! ## Rules
//! - Signals are **marshaled** into the coordinator's task through an mpsc
//!   channel; adapters never touch the queue or the running set.
//! - `spawn` may fail synchronously ([`SpawnError`]); the coordinator
//!   treats that like an error signal and keeps admitting other entries.
//! - An adapter emits at most one terminal signal (`error` or `exited`);
//!   anything sent after the entry is terminal is dropped.
//! - Adapters must be substitutable with a deterministic test double that
//!   emits each signal on demand without a real execution unit.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{SpawnError, WorkError};
use crate::tasks::{TaskDescriptor, TaskId};

/// A signal emitted by a worker (or its adapter) for one task.
#[derive(Debug)]
pub enum WorkerSignal {
    /// The execution unit is up and running.
    Ready,
    /// The execution unit produced a message payload.
    Data(String),
    /// The execution unit failed. Terminal.
    Error(WorkError),
    /// The execution unit terminated with an exit code. Terminal.
    Exited(i32),
}

/// A worker signal tagged with the task it belongs to.
#[derive(Debug)]
pub(crate) struct Signal {
    pub(crate) id: TaskId,
    pub(crate) signal: WorkerSignal,
}

/// Sending half of the worker→coordinator signal channel, bound to one
/// task.
///
/// Clone-able and safe to move into the execution unit's forwarding task;
/// sends never block. Signals sent after the pool shut down are dropped.
#[derive(Clone)]
pub struct SignalSink {
    id: TaskId,
    tx: mpsc::UnboundedSender<Signal>,
}

impl SignalSink {
    pub(crate) fn new(id: TaskId, tx: mpsc::UnboundedSender<Signal>) -> Self {
        Self { id, tx }
    }

    /// Id of the task this sink reports for.
    pub fn task(&self) -> TaskId {
        self.id
    }

    /// Reports the execution unit as up and running.
    pub fn ready(&self) {
        self.send(WorkerSignal::Ready);
    }

    /// Forwards a message payload from the execution unit.
    pub fn data(&self, payload: impl Into<String>) {
        self.send(WorkerSignal::Data(payload.into()));
    }

    /// Reports a mid-execution failure. Terminal.
    pub fn error(&self, err: WorkError) {
        self.send(WorkerSignal::Error(err));
    }

    /// Reports normal termination with an exit code. Terminal.
    pub fn exited(&self, code: i32) {
        self.send(WorkerSignal::Exited(code));
    }

    fn send(&self, signal: WorkerSignal) {
        let _ = self.tx.send(Signal {
            id: self.id,
            signal,
        });
    }
}

/// Handle to a live execution unit held by the running set.
///
/// The pool does not cancel individual tasks; the handle exists so the
/// pool can tear down forwarding tasks on shutdown.
#[derive(Debug)]
pub struct WorkerHandle {
    join: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Wraps the join handle of the unit's forwarding task.
    pub fn new(join: JoinHandle<()>) -> Self {
        Self { join: Some(join) }
    }

    /// Handle for workers with no in-runtime forwarding task (test
    /// doubles, externally supervised units).
    pub fn external() -> Self {
        Self { join: None }
    }

    /// Aborts the forwarding task, if any. Used on pool shutdown.
    pub(crate) fn abort(&self) {
        if let Some(join) = &self.join {
            join.abort();
        }
    }
}

/// Spawns isolated execution units for task descriptors.
///
/// Implementations interpret the descriptor's work reference their own
/// way: [`ProcessAdapter`](crate::worker::ProcessAdapter) treats it as an
/// executable path, [`FnAdapter`](crate::worker::FnAdapter) as a
/// registered closure name.
#[async_trait]
pub trait WorkerAdapter: Send + Sync + 'static {
    /// Starts one execution unit for `descriptor`, wiring its signals to
    /// `sink`.
    ///
    /// Returns the worker handle as soon as the unit is launched; it must
    /// not wait for the unit to finish: the coordinator awaits this call
    /// inside its admission pass. A synchronous failure is reported as
    /// [`SpawnError`]; in that case the adapter must not have emitted any
    /// signal.
    async fn spawn(
        &self,
        descriptor: &TaskDescriptor,
        sink: SignalSink,
    ) -> Result<WorkerHandle, SpawnError>;
}
