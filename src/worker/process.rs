//! # Process-backed worker adapter.
//!
//! [`ProcessAdapter`] interprets a descriptor's work reference as an
//! executable path and runs it as a child process via [`tokio::process`],
//! passing the argument payload as the process's single argument.
//!
//! ## Signal wiring
//! ```text
//! spawn ok          ──► ready
//! stdout line       ──► data(line)
//! exit status       ──► exited(code)
//! spawn refused     ──► SpawnError::Launch (synchronous)
//! read/wait failed  ──► error(WorkError::Io)
//! ```
//!
//! Children are spawned with `kill_on_drop`, so tearing down the
//! forwarding task on pool shutdown also reaps the process.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::error::{SpawnError, WorkError};
use crate::tasks::TaskDescriptor;

use super::adapter::{SignalSink, WorkerAdapter, WorkerHandle};

/// Spawns descriptors as OS processes.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use taskpool::{Pool, PoolConfig, TaskDescriptor};
/// use taskpool::worker::ProcessAdapter;
///
/// # async fn demo() {
/// let pool = Pool::new(PoolConfig::with_capacity(2), Arc::new(ProcessAdapter::new()));
/// let handle = pool.submit(TaskDescriptor::new("/usr/bin/convert", "in.png"));
/// # }
/// ```
#[derive(Default)]
pub struct ProcessAdapter;

impl ProcessAdapter {
    /// Creates the adapter.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WorkerAdapter for ProcessAdapter {
    async fn spawn(
        &self,
        descriptor: &TaskDescriptor,
        sink: SignalSink,
    ) -> Result<WorkerHandle, SpawnError> {
        let mut cmd = Command::new(descriptor.work());
        if !descriptor.arg().is_empty() {
            cmd.arg(descriptor.arg());
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| SpawnError::Launch { source })?;
        let stdout = child.stdout.take();

        let join = tokio::spawn(async move {
            sink.ready();

            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                loop {
                    match lines.next_line().await {
                        Ok(Some(line)) => sink.data(line),
                        Ok(None) => break,
                        Err(source) => {
                            sink.error(WorkError::Io { source });
                            return;
                        }
                    }
                }
            }

            match child.wait().await {
                // Signal-terminated children have no code; report -1.
                Ok(status) => sink.exited(status.code().unwrap_or(-1)),
                Err(source) => sink.error(WorkError::Io { source }),
            }
        });

        Ok(WorkerHandle::new(join))
    }
}
