//! # Task descriptors and ids.
//!
//! A [`TaskDescriptor`] is the immutable unit of submission: a reference to
//! the code that performs the work plus an opaque argument payload. The
//! pool never interprets either field; what a descriptor *means* (resize
//! an image, pad a video, ...) is entirely the caller's concern. The
//! adapter that spawns the execution unit decides how to resolve the work
//! reference: the process adapter treats it as an executable path, the
//! function adapter as a registered closure name.
//!
//! [`TaskId`]s are process-wide, monotonically increasing, and unique for
//! the lifetime of the process; the coordinator keys its running set by
//! them.

use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Global counter backing [`TaskId::next`].
static TASK_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique id of a submitted task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Allocates the next id.
    pub(crate) fn next() -> Self {
        Self(TASK_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Immutable description of one unit of background work.
///
/// Supplied once at submission; afterwards shared (via `Arc`) between the
/// caller's [`TaskHandle`](crate::TaskHandle) and the pool's bookkeeping.
///
/// # Example
/// ```
/// use taskpool::TaskDescriptor;
///
/// let desc = TaskDescriptor::new("ffmpeg", "-i in.mp4 out.mp4").with_label("pad-video");
/// assert_eq!(desc.work(), "ffmpeg");
/// assert_eq!(desc.label(), "pad-video");
/// ```
#[derive(Clone, Debug)]
pub struct TaskDescriptor {
    /// Identifier of the code to execute.
    work: Arc<str>,
    /// Opaque argument forwarded to the execution unit.
    arg: Arc<str>,
    /// Human-readable label used in events and logs.
    label: Cow<'static, str>,
}

impl TaskDescriptor {
    /// Creates a descriptor. The label defaults to the work reference.
    pub fn new(work: impl Into<Arc<str>>, arg: impl Into<Arc<str>>) -> Self {
        let work = work.into();
        let label = Cow::Owned(work.to_string());
        Self {
            work,
            arg: arg.into(),
            label,
        }
    }

    /// Overrides the label used in events and logs.
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Identifier of the code to execute.
    pub fn work(&self) -> &str {
        &self.work
    }

    /// Shared handle to the work reference.
    pub fn work_ref(&self) -> Arc<str> {
        Arc::clone(&self.work)
    }

    /// Opaque argument forwarded to the execution unit.
    pub fn arg(&self) -> &str {
        &self.arg
    }

    /// Shared handle to the argument payload.
    pub fn arg_ref(&self) -> Arc<str> {
        Arc::clone(&self.arg)
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = TaskId::next();
        let b = TaskId::next();
        assert!(b > a);
    }

    #[test]
    fn test_label_defaults_to_work() {
        let desc = TaskDescriptor::new("convert", "in.png");
        assert_eq!(desc.label(), "convert");

        let desc = desc.with_label("thumbnail");
        assert_eq!(desc.label(), "thumbnail");
        assert_eq!(desc.work(), "convert");
    }
}
