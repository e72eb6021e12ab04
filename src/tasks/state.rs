//! # Task lifecycle states.
//!
//! Every submitted task walks exactly one of two sequences:
//!
//! ```text
//! Queued ─► Starting ─► Online ─► Exited     (normal)
//! Queued ─► Starting ─► Errored              (spawn or run failure)
//! ```
//!
//! A step is never skipped or repeated; `Exited` and `Errored` are
//! terminal. The state projection of a task's lifecycle channel is seeded
//! with [`TaskState::Queued`] at submission, before any explicit publish.

/// Lifecycle state of a submitted task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting in the FIFO queue for a free worker slot.
    Queued,
    /// Popped from the queue; the execution unit is being spawned.
    Starting,
    /// The execution unit reported itself ready.
    Online,
    /// The execution unit terminated normally. Terminal.
    Exited,
    /// Spawn failed or the worker failed mid-execution. Terminal.
    Errored,
}

impl TaskState {
    /// True for the two terminal states.
    ///
    /// # Example
    /// ```
    /// use taskpool::TaskState;
    ///
    /// assert!(TaskState::Exited.is_terminal());
    /// assert!(TaskState::Errored.is_terminal());
    /// assert!(!TaskState::Online.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Exited | TaskState::Errored)
    }

    /// Returns a short stable label (snake_case) for use in logs/events.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskState::Queued => "queued",
            TaskState::Starting => "starting",
            TaskState::Online => "online",
            TaskState::Exited => "exited",
            TaskState::Errored => "errored",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}
