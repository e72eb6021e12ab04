//! Queue/running bookkeeping records.
//!
//! A [`QueueEntry`] binds a descriptor to its lifecycle channel; a
//! [`RunningEntry`] additionally holds the live worker handle. An entry
//! lives in exactly one of the coordinator's two collections, the FIFO
//! queue or the running set, from creation until terminal.

use std::sync::Arc;

use crate::events::LifecycleChannel;
use crate::tasks::{TaskDescriptor, TaskHandle, TaskId};
use crate::worker::WorkerHandle;

/// A submitted task waiting in the queue.
pub(crate) struct QueueEntry {
    pub(crate) id: TaskId,
    pub(crate) descriptor: Arc<TaskDescriptor>,
    pub(crate) channel: Arc<LifecycleChannel>,
}

impl QueueEntry {
    /// Creates an entry with a fresh id and a channel seeded at `Queued`.
    pub(crate) fn new(descriptor: TaskDescriptor, replay_capacity: usize) -> Self {
        Self {
            id: TaskId::next(),
            descriptor: Arc::new(descriptor),
            channel: LifecycleChannel::new(replay_capacity),
        }
    }

    /// The caller-facing view of this entry.
    pub(crate) fn handle(&self) -> TaskHandle {
        TaskHandle::new(
            self.id,
            Arc::clone(&self.descriptor),
            Arc::clone(&self.channel),
        )
    }

    pub(crate) fn label(&self) -> &str {
        self.descriptor.label()
    }

    /// Moves the entry into the running set, attaching its worker.
    pub(crate) fn into_running(self, worker: WorkerHandle) -> RunningEntry {
        RunningEntry {
            descriptor: self.descriptor,
            channel: self.channel,
            worker,
        }
    }
}

/// An admitted task with a live worker.
pub(crate) struct RunningEntry {
    pub(crate) descriptor: Arc<TaskDescriptor>,
    pub(crate) channel: Arc<LifecycleChannel>,
    pub(crate) worker: WorkerHandle,
}

impl RunningEntry {
    pub(crate) fn label(&self) -> &str {
        self.descriptor.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskState;

    #[test]
    fn test_entry_seeds_channel_and_shares_descriptor() {
        let entry = QueueEntry::new(TaskDescriptor::new("work", "arg"), 8);
        let handle = entry.handle();

        assert_eq!(handle.id(), entry.id);
        assert_eq!(handle.descriptor().work(), "work");
        assert_eq!(entry.channel.current_state(), TaskState::Queued);
    }

    #[test]
    fn test_into_running_keeps_channel() {
        let entry = QueueEntry::new(TaskDescriptor::new("work", "arg"), 8);
        let channel = Arc::clone(&entry.channel);

        let running = entry.into_running(WorkerHandle::external());
        assert!(Arc::ptr_eq(&channel, &running.channel));
    }
}
