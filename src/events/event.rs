//! # Pool-wide observability events.
//!
//! The [`EventKind`] enum classifies the transitions the coordinator
//! reports on the bus: submissions, admissions, worker lifecycle, and
//! shutdown. The [`Event`] struct carries metadata such as timestamps,
//! task ids, failure reasons, and exit codes.
//!
//! These events are for observers (logging, metrics); per-task consumers
//! follow their own [`TaskHandle`](crate::TaskHandle) projections instead.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! observed out of order.
//!
//! ## Example
//! ```rust
//! use taskpool::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskErrored)
//!     .with_label("pad-video")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskErrored);
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::tasks::TaskId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of pool events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A descriptor was accepted into the queue.
    ///
    /// Sets:
    /// - `task`, `label`
    /// - `queued`: queue length after the enqueue
    TaskSubmitted,

    /// An entry was popped from the queue and its worker is being spawned.
    ///
    /// Sets:
    /// - `task`, `label`
    /// - `queued`: queue length after the dequeue
    TaskAdmitted,

    /// A worker reported itself ready.
    ///
    /// Sets:
    /// - `task`, `label`
    TaskOnline,

    /// A worker terminated normally.
    ///
    /// Sets:
    /// - `task`, `label`
    /// - `code`: exit code
    TaskExited,

    /// A running worker failed mid-execution.
    ///
    /// Sets:
    /// - `task`, `label`
    /// - `reason`: failure message
    TaskErrored,

    /// The adapter failed to start an execution unit.
    ///
    /// Sets:
    /// - `task`, `label`
    /// - `reason`: spawn error message
    SpawnFailed,

    /// The pool was asked to shut down.
    ///
    /// Sets:
    /// - `queued`: entries abandoned in the queue
    ShutdownRequested,
}

/// Pool event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Id of the task, if applicable.
    pub task: Option<TaskId>,
    /// Human-readable task label.
    pub label: Option<Arc<str>>,
    /// Human-readable reason (spawn/run failures).
    pub reason: Option<Arc<str>>,
    /// Worker exit code.
    pub code: Option<i32>,
    /// Queue length observed at the transition.
    pub queued: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp
    /// and the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            label: None,
            reason: None,
            code: None,
            queued: None,
        }
    }

    /// Attaches a task id.
    #[inline]
    pub fn with_task(mut self, task: TaskId) -> Self {
        self.task = Some(task);
        self
    }

    /// Attaches a task label.
    #[inline]
    pub fn with_label(mut self, label: impl Into<Arc<str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a worker exit code.
    #[inline]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches the observed queue length.
    #[inline]
    pub fn with_queued(mut self, queued: usize) -> Self {
        self.queued = Some(queued);
        self
    }

    /// True for the per-task terminal kinds.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::TaskExited | EventKind::TaskErrored | EventKind::SpawnFailed
        )
    }
}
