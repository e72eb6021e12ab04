//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints pool events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [submitted] task=task-0 label=resize queued=1
//! [admitted] task=task-0 label=resize queued=0
//! [online] task=task-0 label=resize
//! [exited] task=task-0 label=resize code=0
//! [spawn-failed] task=task-1 label=pad err="no work registered for 'pad'"
//! [errored] task=task-2 label=scale err="execution failed: oom"
//! [shutdown-requested] queued=3
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use -
/// implement a custom [`Subscribe`] for structured logging or metrics
/// collection.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Creates the subscriber.
    pub fn new() -> Self {
        Self
    }
}

fn opt<T: std::fmt::Display>(v: &Option<T>) -> String {
    v.as_ref().map_or_else(|| "?".to_string(), T::to_string)
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.map(|t| t.to_string()).unwrap_or_else(|| "?".into());
        let label = opt(&e.label);
        match e.kind {
            EventKind::TaskSubmitted => {
                println!("[submitted] task={task} label={label} queued={}", opt(&e.queued));
            }
            EventKind::TaskAdmitted => {
                println!("[admitted] task={task} label={label} queued={}", opt(&e.queued));
            }
            EventKind::TaskOnline => {
                println!("[online] task={task} label={label}");
            }
            EventKind::TaskExited => {
                println!("[exited] task={task} label={label} code={}", opt(&e.code));
            }
            EventKind::TaskErrored => {
                println!("[errored] task={task} label={label} err={:?}", e.reason);
            }
            EventKind::SpawnFailed => {
                println!("[spawn-failed] task={task} label={label} err={:?}", e.reason);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested] queued={}", opt(&e.queued));
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
