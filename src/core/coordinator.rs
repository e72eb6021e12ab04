//! # Coordinator: the serialized admission loop.
//!
//! The coordinator is the sole owner and sole mutator of the FIFO queue
//! and the running set. It runs as one spawned task draining two mpsc
//! channels (submissions from the pool facade, signals from workers), so
//! every mutation is serialized and no locks guard the collections.
//!
//! ## Architecture
//! ```text
//! Pool::submit ──► [submit mpsc] ──┐
//!                                  ▼
//!                        ┌──────────────────┐      spawn()
//!                        │ Coordinator loop │ ───────────────► WorkerAdapter
//!                        │  queue: VecDeque │
//!                        │  running: Map    │ ◄─────────────── SignalSink
//!                        └──────────────────┘      [signal mpsc]
//!                                  │
//!                                  └──► lifecycle channels, event bus
//! ```
//!
//! ## Rules
//! - **Admission order** is strict FIFO; an entry is never admitted while
//!   a predecessor is still queued.
//! - **Batched submissions**: pending submissions are drained before the
//!   admission pass runs, so positions presented to a burst of `submit`
//!   calls reflect the whole batch.
//! - **One pass per terminal signal**: each worker exit or error frees its
//!   slot and triggers exactly one admission pass on this same task; a
//!   burst of completions refills all free slots without recursion.
//! - **Queue positions** are recomputed and republished after every
//!   admission pass (1-indexed from the queue front); the channel
//!   suppresses consecutive duplicates.
//! - A spawn failure marks only the affected entry as errored; the pass
//!   keeps admitting subsequent entries into the freed slot.
//! - An [`AdmissionError`] is a defect: the loop stops and abandons its
//!   entries rather than continuing with corrupted bookkeeping.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::PoolConfig;
use crate::error::AdmissionError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{QueueEntry, RunningEntry, TaskId, TaskState};
use crate::worker::{Signal, SignalSink, WorkerAdapter, WorkerSignal};

/// Owns the queue and the running set; see the module docs.
pub(crate) struct Coordinator {
    cfg: PoolConfig,
    adapter: Arc<dyn WorkerAdapter>,
    bus: Bus,

    queue: VecDeque<QueueEntry>,
    running: HashMap<TaskId, RunningEntry>,

    submit_rx: mpsc::UnboundedReceiver<QueueEntry>,
    signal_rx: mpsc::UnboundedReceiver<Signal>,
    // Kept so `signal_rx` stays open while workers come and go.
    signal_tx: mpsc::UnboundedSender<Signal>,
}

impl Coordinator {
    /// Creates a coordinator and returns the pool facade's submission
    /// sender.
    pub(crate) fn new(
        cfg: PoolConfig,
        adapter: Arc<dyn WorkerAdapter>,
        bus: Bus,
    ) -> (Self, mpsc::UnboundedSender<QueueEntry>) {
        let (submit_tx, submit_rx) = mpsc::unbounded_channel();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        (
            Self {
                cfg,
                adapter,
                bus,
                queue: VecDeque::new(),
                running: HashMap::new(),
                submit_rx,
                signal_rx,
                signal_tx,
            },
            submit_tx,
        )
    }

    /// Runs the loop until the token is cancelled or the pool facade is
    /// dropped, then abandons whatever is left.
    pub(crate) async fn run(mut self, token: CancellationToken) {
        let reason = match self.run_inner(&token).await {
            Ok(()) => "pool is shut down",
            Err(e) => {
                eprintln!("[taskpool] coordinator stopped: {}", e.as_message());
                "coordinator failed"
            }
        };
        self.drain(reason);
    }

    async fn run_inner(&mut self, token: &CancellationToken) -> Result<(), AdmissionError> {
        loop {
            tokio::select! {
                _ = token.cancelled() => return Ok(()),

                entry = self.submit_rx.recv() => {
                    let Some(entry) = entry else {
                        // Pool facade dropped; no further submissions.
                        return Ok(());
                    };
                    self.enqueue(entry);
                    // Drain the burst so one admission pass sees the
                    // whole batch.
                    while let Ok(next) = self.submit_rx.try_recv() {
                        self.enqueue(next);
                    }
                    self.admit().await?;
                }

                Some(sig) = self.signal_rx.recv() => {
                    self.apply_signal(sig).await?;
                }
            }
        }
    }

    /// Appends an entry to the queue tail.
    fn enqueue(&mut self, entry: QueueEntry) {
        self.bus.publish(
            Event::new(EventKind::TaskSubmitted)
                .with_task(entry.id)
                .with_label(entry.label())
                .with_queued(self.queue.len() + 1),
        );
        self.queue.push_back(entry);
    }

    /// Admits queued entries while free slots remain, then republishes
    /// queue positions for everything still waiting.
    async fn admit(&mut self) -> Result<(), AdmissionError> {
        while self.running.len() < self.cfg.workers_clamped() {
            let Some(entry) = self.queue.pop_front() else {
                break;
            };
            if self.running.contains_key(&entry.id) {
                return Err(AdmissionError::AdmittedTwice { id: entry.id });
            }

            entry.channel.set_state(TaskState::Starting);
            self.bus.publish(
                Event::new(EventKind::TaskAdmitted)
                    .with_task(entry.id)
                    .with_label(entry.label())
                    .with_queued(self.queue.len()),
            );

            let sink = SignalSink::new(entry.id, self.signal_tx.clone());
            match self.adapter.spawn(&entry.descriptor, sink).await {
                Ok(worker) => {
                    self.running.insert(entry.id, entry.into_running(worker));
                }
                Err(err) => {
                    // Only this entry fails; its slot stays free for the
                    // next iteration of the pass.
                    self.bus.publish(
                        Event::new(EventKind::SpawnFailed)
                            .with_task(entry.id)
                            .with_label(entry.label())
                            .with_reason(err.as_message()),
                    );
                    entry.channel.fail(err.as_message());
                }
            }
        }

        self.publish_positions();
        Ok(())
    }

    /// Applies one worker signal to the owning entry's channel. Terminal
    /// signals free the slot and trigger one admission pass.
    async fn apply_signal(&mut self, sig: Signal) -> Result<(), AdmissionError> {
        match sig.signal {
            WorkerSignal::Ready => {
                if let Some(entry) = self.running.get(&sig.id) {
                    entry.channel.set_state(TaskState::Online);
                    self.bus.publish(
                        Event::new(EventKind::TaskOnline)
                            .with_task(sig.id)
                            .with_label(entry.label()),
                    );
                }
            }
            WorkerSignal::Data(payload) => {
                if let Some(entry) = self.running.get(&sig.id) {
                    entry.channel.push_message(payload);
                }
            }
            WorkerSignal::Error(err) => {
                // Signals for entries already terminal are dropped.
                let Some(entry) = self.running.remove(&sig.id) else {
                    return Ok(());
                };
                self.ensure_not_queued(sig.id)?;
                self.bus.publish(
                    Event::new(EventKind::TaskErrored)
                        .with_task(sig.id)
                        .with_label(entry.label())
                        .with_reason(err.as_message()),
                );
                entry.channel.fail(err.as_message());
                self.admit().await?;
            }
            WorkerSignal::Exited(code) => {
                let Some(entry) = self.running.remove(&sig.id) else {
                    return Ok(());
                };
                self.ensure_not_queued(sig.id)?;
                entry.channel.set_state(TaskState::Exited);
                entry.channel.complete();
                self.bus.publish(
                    Event::new(EventKind::TaskExited)
                        .with_task(sig.id)
                        .with_label(entry.label())
                        .with_code(code),
                );
                self.admit().await?;
            }
        }
        Ok(())
    }

    /// Publishes the 1-indexed position of every still-queued entry.
    fn publish_positions(&self) {
        for (idx, entry) in self.queue.iter().enumerate() {
            entry.channel.set_position(idx + 1);
        }
    }

    /// Invariant check: a terminal entry must not also sit in the queue.
    fn ensure_not_queued(&self, id: TaskId) -> Result<(), AdmissionError> {
        if self.queue.iter().any(|e| e.id == id) {
            return Err(AdmissionError::DualResidency { id });
        }
        Ok(())
    }

    /// Abandons queued entries and tears down running workers.
    fn drain(&mut self, reason: &str) {
        self.bus
            .publish(Event::new(EventKind::ShutdownRequested).with_queued(self.queue.len()));

        for entry in self.queue.drain(..) {
            entry.channel.abandon(reason);
        }
        for (_, entry) in self.running.drain() {
            entry.worker.abort();
            entry.channel.abandon(reason);
        }
    }
}
