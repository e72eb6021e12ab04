//! # Function-backed worker adapter.
//!
//! [`FnAdapter`] resolves a descriptor's work reference against a registry
//! of named async closures and runs the matching one on the runtime. This
//! is the in-process counterpart of the OS-level
//! [`ProcessAdapter`](crate::worker::ProcessAdapter): isolation is a
//! spawned runtime task instead of a child process.
//!
//! Each spawn invokes the closure afresh, producing a new future that owns
//! its own state; shared state between runs must be an explicit `Arc`
//! inside the closure.
//!
//! ## Example
//! ```rust
//! use taskpool::worker::FnAdapter;
//! use taskpool::WorkError;
//!
//! let adapter = FnAdapter::new().register("shout", |arg, messages| async move {
//!     messages.send(arg.to_uppercase());
//!     Ok::<_, WorkError>(0)
//! });
//!
//! assert!(adapter.contains("shout"));
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{SpawnError, WorkError};
use crate::tasks::TaskDescriptor;

use super::adapter::{SignalSink, WorkerAdapter, WorkerHandle};

/// Message-emitting half handed to a registered closure.
///
/// Restricts the worker's [`SignalSink`] to `data` payloads; lifecycle
/// signals stay with the adapter.
#[derive(Clone)]
pub struct MessageSender {
    sink: SignalSink,
}

impl MessageSender {
    /// Emits one message payload on the task's message projection.
    pub fn send(&self, payload: impl Into<String>) {
        self.sink.data(payload);
    }
}

type WorkFuture = Pin<Box<dyn Future<Output = Result<i32, WorkError>> + Send>>;
type WorkFn = dyn Fn(Arc<str>, MessageSender) -> WorkFuture + Send + Sync;

/// Registry of named async closures, used as a worker adapter.
///
/// The registry is built up front and immutable afterwards; spawning an
/// unknown name fails synchronously with
/// [`SpawnError::UnknownWork`].
#[derive(Default)]
pub struct FnAdapter {
    registry: HashMap<Cow<'static, str>, Arc<WorkFn>>,
}

impl FnAdapter {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a closure under `name` (builder style).
    ///
    /// The closure receives the descriptor's argument and a
    /// [`MessageSender`], and resolves to an exit code or a [`WorkError`].
    pub fn register<F, Fut>(mut self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(Arc<str>, MessageSender) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<i32, WorkError>> + Send + 'static,
    {
        let work: Arc<WorkFn> = Arc::new(move |arg, msgs| -> WorkFuture { Box::pin(f(arg, msgs)) });
        self.registry.insert(name.into(), work);
        self
    }

    /// True if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Wraps the adapter for handing to a pool builder.
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl WorkerAdapter for FnAdapter {
    async fn spawn(
        &self,
        descriptor: &TaskDescriptor,
        sink: SignalSink,
    ) -> Result<WorkerHandle, SpawnError> {
        let Some(work) = self.registry.get(descriptor.work()) else {
            return Err(SpawnError::UnknownWork {
                work: descriptor.work_ref(),
            });
        };

        let fut = (work.as_ref())(
            descriptor.arg_ref(),
            MessageSender { sink: sink.clone() },
        );
        let join = tokio::spawn(async move {
            sink.ready();
            match fut.await {
                Ok(code) => sink.exited(code),
                Err(err) => sink.error(err),
            }
        });

        Ok(WorkerHandle::new(join))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::adapter::WorkerSignal;
    use tokio::sync::mpsc;

    fn sink_pair() -> (SignalSink, mpsc::UnboundedReceiver<super::super::adapter::Signal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SignalSink::new(crate::tasks::TaskId::next(), tx), rx)
    }

    #[tokio::test]
    async fn test_spawn_runs_closure_and_reports_exit() {
        let adapter = FnAdapter::new().register("echo", |arg, messages| async move {
            messages.send(arg.to_string());
            Ok::<_, WorkError>(0)
        });

        let (sink, mut rx) = sink_pair();
        adapter
            .spawn(&TaskDescriptor::new("echo", "hello"), sink)
            .await
            .expect("spawn");

        assert!(matches!(
            rx.recv().await.expect("signal").signal,
            WorkerSignal::Ready
        ));
        assert!(matches!(
            rx.recv().await.expect("signal").signal,
            WorkerSignal::Data(ref p) if p == "hello"
        ));
        assert!(matches!(
            rx.recv().await.expect("signal").signal,
            WorkerSignal::Exited(0)
        ));
    }

    #[tokio::test]
    async fn test_failing_closure_reports_error_signal() {
        let adapter = FnAdapter::new().register("boom", |_, _| async move {
            Err::<i32, _>(WorkError::Fail {
                error: "kaput".into(),
            })
        });

        let (sink, mut rx) = sink_pair();
        adapter
            .spawn(&TaskDescriptor::new("boom", ""), sink)
            .await
            .expect("spawn");

        assert!(matches!(
            rx.recv().await.expect("signal").signal,
            WorkerSignal::Ready
        ));
        assert!(matches!(
            rx.recv().await.expect("signal").signal,
            WorkerSignal::Error(WorkError::Fail { ref error }) if error == "kaput"
        ));
    }

    #[tokio::test]
    async fn test_unknown_work_fails_synchronously() {
        let adapter = FnAdapter::new();
        let (sink, mut rx) = sink_pair();

        let err = adapter
            .spawn(&TaskDescriptor::new("nope", ""), sink)
            .await
            .expect_err("unknown work");
        assert!(matches!(err, SpawnError::UnknownWork { .. }));

        // No signal may have been emitted on a synchronous failure.
        assert!(rx.try_recv().is_err());
    }
}
