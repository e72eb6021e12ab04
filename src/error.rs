//! Error types used by the pool and its workers.
//!
//! This module defines three error enums, one per failure scope:
//!
//! - [`AdmissionError`] — internal invariant violations in the coordinator.
//! - [`SpawnError`] — a worker adapter failed to start an execution unit.
//! - [`WorkError`] — a running worker failed mid-execution.
//!
//! All types provide helper methods (`as_label`, `as_message`) for
//! logging and event metadata.
//!
//! Spawn and work failures are scoped to the affected task's lifecycle
//! channel; they never abort the coordinator or other tasks. An
//! [`AdmissionError`] is fatal: it indicates a defect in the coordinator
//! itself and terminates the admission loop.

use std::sync::Arc;

use thiserror::Error;

use crate::tasks::TaskId;

/// # Coordinator invariant violations.
///
/// These are defects, not runtime conditions: an entry must live in exactly
/// one of the queue or the running set from submission until terminal.
/// The coordinator stops rather than continuing with corrupted bookkeeping;
/// callers should not catch and retry these.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AdmissionError {
    /// An entry was found in both the queue and the running set.
    #[error("task {id} present in both queue and running set")]
    DualResidency {
        /// Id of the offending entry.
        id: TaskId,
    },

    /// An entry reached the admission point while already running.
    #[error("task {id} admitted twice")]
    AdmittedTwice {
        /// Id of the offending entry.
        id: TaskId,
    },
}

impl AdmissionError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            AdmissionError::DualResidency { .. } => "admission_dual_residency",
            AdmissionError::AdmittedTwice { .. } => "admission_admitted_twice",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            AdmissionError::DualResidency { id } => {
                format!("entry {id} is queued and running at once")
            }
            AdmissionError::AdmittedTwice { id } => {
                format!("entry {id} was admitted a second time")
            }
        }
    }
}

/// # Errors produced while starting an execution unit.
///
/// A spawn failure is reported on the affected task's channel only; the
/// coordinator keeps admitting subsequently queued entries.
///
/// # Example
/// ```
/// use taskpool::SpawnError;
///
/// let err = SpawnError::UnknownWork { work: "resize".into() };
/// assert_eq!(err.as_label(), "spawn_unknown_work");
/// ```
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SpawnError {
    /// The descriptor's work reference does not resolve to anything the
    /// adapter can execute.
    #[error("unknown work reference: {work}")]
    UnknownWork {
        /// The unresolved work reference.
        work: Arc<str>,
    },

    /// The OS refused to start the execution unit.
    #[error("failed to launch worker: {source}")]
    Launch {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The adapter rejected the spawn (resource exhaustion, shutdown, ...).
    #[error("spawn rejected: {reason}")]
    Rejected {
        /// Why the adapter refused.
        reason: String,
    },
}

impl SpawnError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SpawnError::UnknownWork { .. } => "spawn_unknown_work",
            SpawnError::Launch { .. } => "spawn_launch_failed",
            SpawnError::Rejected { .. } => "spawn_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SpawnError::UnknownWork { work } => format!("no work registered for '{work}'"),
            SpawnError::Launch { source } => format!("launch failed: {source}"),
            SpawnError::Rejected { reason } => format!("rejected: {reason}"),
        }
    }
}

/// # Errors produced by a running worker.
///
/// Reported on the affected task's channel; the worker's slot is freed and
/// admission of queued entries resumes. There is no automatic retry at this
/// layer; consumers must treat the errored terminal state as an expected
/// outcome, equal in standing to a normal exit.
///
/// # Example
/// ```
/// use taskpool::WorkError;
///
/// let err = WorkError::Fail { error: "boom".into() };
/// assert_eq!(err.as_label(), "work_failed");
/// ```
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkError {
    /// The worker reported a failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Communication with the execution unit broke down (pipe closed,
    /// wait failed).
    #[error("worker i/o error: {source}")]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl WorkError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkError::Fail { .. } => "work_failed",
            WorkError::Io { .. } => "work_io",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WorkError::Fail { error } => format!("error: {error}"),
            WorkError::Io { source } => format!("i/o: {source}"),
        }
    }
}
