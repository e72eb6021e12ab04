//! # Task handle: the caller-facing view of one submission.
//!
//! [`TaskHandle`] is returned by [`Pool::submit`](crate::Pool::submit). It
//! exposes the task's three lifecycle projections (messages, state, and
//! queue position), each multicast and replaying its latest value to late
//! subscribers, plus the originally submitted descriptor.
//!
//! Handles are cheap to clone; every clone observes the same underlying
//! channel. Dropping all handles does not cancel the task; a caller that
//! loses interest in a queued task simply stops observing it.

use std::sync::Arc;

use crate::events::{LifecycleChannel, ProjectionReceiver};
use crate::tasks::{TaskDescriptor, TaskId, TaskState};

/// Live view of a submitted task.
///
/// # Example
/// ```no_run
/// # use taskpool::{Pool, TaskDescriptor};
/// # async fn demo(pool: Pool) {
/// let handle = pool.submit(TaskDescriptor::new("resize", "photo.png"));
///
/// let mut state = handle.state();
/// while let Some(s) = state.recv().await {
///     println!("{}: {s}", handle.id());
///     if s.is_terminal() {
///         break;
///     }
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    descriptor: Arc<TaskDescriptor>,
    channel: Arc<LifecycleChannel>,
}

impl TaskHandle {
    pub(crate) fn new(
        id: TaskId,
        descriptor: Arc<TaskDescriptor>,
        channel: Arc<LifecycleChannel>,
    ) -> Self {
        Self {
            id,
            descriptor,
            channel,
        }
    }

    /// Unique id of this submission.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// The descriptor supplied at submission.
    pub fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    /// Subscribes to lifecycle states. The first received value is the
    /// latest state at subscription time (at minimum the `Queued` seed).
    pub fn state(&self) -> ProjectionReceiver<TaskState> {
        self.channel.state()
    }

    /// Subscribes to worker messages, replaying the latest payload first
    /// when one has already been emitted.
    pub fn messages(&self) -> ProjectionReceiver<String> {
        self.channel.messages()
    }

    /// Subscribes to 1-indexed queue positions. Values are published only
    /// while the task is queued and never repeat consecutively.
    pub fn queue_position(&self) -> ProjectionReceiver<usize> {
        self.channel.queue_position()
    }

    /// Latest lifecycle state without subscribing.
    pub fn current_state(&self) -> TaskState {
        self.channel.current_state()
    }

    /// Terminal failure reason, if the task errored.
    pub fn failure(&self) -> Option<Arc<str>> {
        self.channel.failure()
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("label", &self.descriptor.label())
            .field("state", &self.current_state())
            .finish()
    }
}
