//! End-to-end pool behavior driven by a deterministic scripted adapter.
//!
//! `ManualAdapter` stands in for real execution units: it records the
//! `SignalSink` of every spawn so each test can emit `ready`, `data`,
//! `error`, and `exited` on demand, and it can be told to fail a spawn
//! synchronously.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use taskpool::worker::{SignalSink, WorkerAdapter, WorkerHandle};
use taskpool::{
    EventKind, Pool, PoolConfig, SpawnError, TaskDescriptor, TaskHandle, TaskState, WorkError,
};

const TICK: Duration = Duration::from_secs(5);

#[derive(Default)]
struct ManualState {
    sinks: HashMap<String, SignalSink>,
    order: Vec<String>,
    fail: HashSet<String>,
}

/// Deterministic test double for [`WorkerAdapter`]: no real execution
/// units, every signal is emitted by the test.
#[derive(Default)]
struct ManualAdapter {
    state: Mutex<ManualState>,
}

impl ManualAdapter {
    fn arc() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes the next spawn of `work` fail synchronously.
    fn fail_spawn(&self, work: &str) {
        self.state.lock().unwrap().fail.insert(work.to_string());
    }

    /// Work references in spawn order.
    fn spawned(&self) -> Vec<String> {
        self.state.lock().unwrap().order.clone()
    }

    /// Waits until `work` has been spawned and returns its sink.
    async fn sink(&self, work: &str) -> SignalSink {
        for _ in 0..10_000 {
            if let Some(sink) = self.state.lock().unwrap().sinks.get(work) {
                return sink.clone();
            }
            tokio::task::yield_now().await;
        }
        panic!("worker for '{work}' was never spawned");
    }
}

#[async_trait]
impl WorkerAdapter for ManualAdapter {
    async fn spawn(
        &self,
        descriptor: &TaskDescriptor,
        sink: SignalSink,
    ) -> Result<WorkerHandle, SpawnError> {
        let mut state = self.state.lock().unwrap();
        state.order.push(descriptor.work().to_string());
        if state.fail.remove(descriptor.work()) {
            return Err(SpawnError::Rejected {
                reason: format!("injected failure for '{}'", descriptor.work()),
            });
        }
        state.sinks.insert(descriptor.work().to_string(), sink);
        Ok(WorkerHandle::external())
    }
}

/// Awaits the handle's state stream until `want` shows up.
async fn wait_for_state(handle: &TaskHandle, want: TaskState) {
    let mut rx = handle.state();
    tokio::time::timeout(TICK, async {
        while let Some(state) = rx.recv().await {
            if state == want {
                return;
            }
            assert!(
                !state.is_terminal(),
                "{} reached terminal {state} while waiting for {want}",
                handle.id()
            );
        }
        panic!("{} stream ended before {want}", handle.id());
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {want}"));
}

/// Drains a state subscription until the stream closes.
///
/// Subscribe before driving signals to capture the history from the
/// `Queued` seed onwards; the projection buffers what the test has not
/// read yet.
async fn drain_states(mut rx: taskpool::ProjectionReceiver<TaskState>) -> Vec<TaskState> {
    tokio::time::timeout(TICK, async {
        let mut seen = Vec::new();
        while let Some(state) = rx.recv().await {
            seen.push(state);
        }
        seen
    })
    .await
    .expect("timed out collecting states")
}

// === Scenario A: batch admission, positions, refill on exit ===

#[tokio::test]
async fn test_batch_admits_to_capacity_and_ranks_the_rest() {
    let adapter = ManualAdapter::arc();
    let pool = Pool::new(PoolConfig::with_capacity(2), adapter.clone());

    let t1 = pool.submit(TaskDescriptor::new("t1", ""));
    let t2 = pool.submit(TaskDescriptor::new("t2", ""));
    let t3 = pool.submit(TaskDescriptor::new("t3", ""));
    let t4 = pool.submit(TaskDescriptor::new("t4", ""));

    let s1 = adapter.sink("t1").await;
    let s2 = adapter.sink("t2").await;
    s1.ready();
    s2.ready();
    wait_for_state(&t1, TaskState::Online).await;
    wait_for_state(&t2, TaskState::Online).await;

    // Only the first two entered the running set.
    assert_eq!(adapter.spawned(), ["t1", "t2"]);

    // The queued rest see 1-indexed positions reflecting the batch.
    let mut p3 = t3.queue_position();
    let mut p4 = t4.queue_position();
    assert_eq!(p3.recv().await, Some(1));
    assert_eq!(p4.recv().await, Some(2));

    // T1 exits: T3 is admitted, T4 moves to the front.
    s1.exited(0);
    wait_for_state(&t1, TaskState::Exited).await;
    let s3 = adapter.sink("t3").await;
    wait_for_state(&t3, TaskState::Starting).await;
    assert_eq!(p4.recv().await, Some(1));

    // T2 exits: T4 is admitted.
    s2.exited(0);
    let s4 = adapter.sink("t4").await;
    wait_for_state(&t4, TaskState::Starting).await;

    s3.exited(0);
    s4.exited(0);
    wait_for_state(&t3, TaskState::Exited).await;
    wait_for_state(&t4, TaskState::Exited).await;

    assert_eq!(adapter.spawned(), ["t1", "t2", "t3", "t4"]);
    pool.shutdown().await;
}

// === Scenario B: synchronous spawn failure ===

#[tokio::test]
async fn test_spawn_failure_errors_entry_and_admission_continues() {
    let adapter = ManualAdapter::arc();
    adapter.fail_spawn("t1");
    let pool = Pool::new(PoolConfig::with_capacity(1), adapter.clone());

    let t1 = pool.submit(TaskDescriptor::new("t1", ""));
    let t2 = pool.submit(TaskDescriptor::new("t2", ""));
    let t1_states = t1.state();

    // T1 errors without ever exiting.
    let states = drain_states(t1_states).await;
    assert_eq!(
        states,
        [TaskState::Queued, TaskState::Starting, TaskState::Errored]
    );
    assert!(t1.failure().expect("failure reason").contains("injected"));

    // T2 is admitted without additional delay.
    let s2 = adapter.sink("t2").await;
    s2.ready();
    s2.exited(0);
    wait_for_state(&t2, TaskState::Exited).await;

    pool.shutdown().await;
}

// === Scenario C: replay-on-subscribe after terminal ===

#[tokio::test]
async fn test_late_subscriber_replays_terminal_state_only() {
    let adapter = ManualAdapter::arc();
    let pool = Pool::new(PoolConfig::with_capacity(1), adapter.clone());

    let t1 = pool.submit(TaskDescriptor::new("t1", ""));
    let s1 = adapter.sink("t1").await;
    s1.ready();
    s1.exited(0);
    wait_for_state(&t1, TaskState::Exited).await;

    // A subscriber attaching now sees Exited first, with no re-traversal
    // of earlier states, and then end-of-stream.
    let mut late = t1.state();
    assert_eq!(late.recv().await, Some(TaskState::Exited));
    assert_eq!(late.recv().await, None);

    pool.shutdown().await;
}

// === State machine: no skips, no repeats ===

#[tokio::test]
async fn test_state_sequence_is_the_full_normal_prefix() {
    let adapter = ManualAdapter::arc();
    let pool = Pool::new(PoolConfig::with_capacity(1), adapter.clone());

    let t1 = pool.submit(TaskDescriptor::new("t1", ""));
    let t1_states = t1.state();

    let s1 = adapter.sink("t1").await;
    s1.ready();
    s1.data("progress");
    s1.exited(0);

    let states = drain_states(t1_states).await;
    assert_eq!(
        states,
        [
            TaskState::Queued,
            TaskState::Starting,
            TaskState::Online,
            TaskState::Exited
        ]
    );
    pool.shutdown().await;
}

// === FIFO admission ===

#[tokio::test]
async fn test_admission_is_strict_fifo() {
    let adapter = ManualAdapter::arc();
    let pool = Pool::new(PoolConfig::with_capacity(1), adapter.clone());

    let handles: Vec<_> = (1..=5)
        .map(|i| pool.submit(TaskDescriptor::new(format!("t{i}").as_str(), "")))
        .collect();

    for i in 1..=5 {
        let sink = adapter.sink(&format!("t{i}")).await;
        sink.ready();
        sink.exited(0);
        wait_for_state(&handles[i - 1], TaskState::Exited).await;
    }

    assert_eq!(adapter.spawned(), ["t1", "t2", "t3", "t4", "t5"]);
    pool.shutdown().await;
}

// === Queue positions strictly decrease by one ===

#[tokio::test]
async fn test_queue_position_decreases_by_one_without_duplicates() {
    let adapter = ManualAdapter::arc();
    let pool = Pool::new(PoolConfig::with_capacity(1), adapter.clone());

    let _t1 = pool.submit(TaskDescriptor::new("t1", ""));
    let _t2 = pool.submit(TaskDescriptor::new("t2", ""));
    let _t3 = pool.submit(TaskDescriptor::new("t3", ""));
    let t4 = pool.submit(TaskDescriptor::new("t4", ""));

    let mut p4 = t4.queue_position();
    assert_eq!(p4.recv().await, Some(3));

    let s1 = adapter.sink("t1").await;
    s1.exited(0);
    assert_eq!(p4.recv().await, Some(2));

    let s2 = adapter.sink("t2").await;
    s2.exited(0);
    assert_eq!(p4.recv().await, Some(1));

    pool.shutdown().await;
}

// === Concurrency cap ===

#[tokio::test]
async fn test_running_set_never_exceeds_capacity() {
    let adapter = ManualAdapter::arc();
    let pool = Pool::new(PoolConfig::with_capacity(3), adapter.clone());

    let handles: Vec<_> = (1..=7)
        .map(|i| pool.submit(TaskDescriptor::new(format!("t{i}").as_str(), "")))
        .collect();

    for h in handles.iter().take(3) {
        wait_for_state(h, TaskState::Starting).await;
    }
    // With three slots busy, nothing beyond t3 has been spawned.
    assert_eq!(adapter.spawned().len(), 3);

    // A burst of completions refills every slot, but only up to the cap.
    adapter.sink("t1").await.exited(0);
    adapter.sink("t2").await.exited(0);
    for h in handles.iter().skip(3).take(2) {
        wait_for_state(h, TaskState::Starting).await;
    }
    assert_eq!(adapter.spawned().len(), 5);

    pool.shutdown().await;
}

// === Mid-run failure frees the slot ===

#[tokio::test]
async fn test_worker_error_frees_slot_and_admits_next() {
    let adapter = ManualAdapter::arc();
    let pool = Pool::new(PoolConfig::with_capacity(1), adapter.clone());

    let t1 = pool.submit(TaskDescriptor::new("t1", ""));
    let t2 = pool.submit(TaskDescriptor::new("t2", ""));
    let t1_states = t1.state();

    let s1 = adapter.sink("t1").await;
    s1.ready();
    s1.error(WorkError::Fail {
        error: "corrupt input".into(),
    });

    let states = drain_states(t1_states).await;
    assert_eq!(
        states,
        [
            TaskState::Queued,
            TaskState::Starting,
            TaskState::Online,
            TaskState::Errored
        ]
    );
    assert!(t1.failure().expect("failure reason").contains("corrupt input"));

    let s2 = adapter.sink("t2").await;
    s2.ready();
    s2.exited(0);
    wait_for_state(&t2, TaskState::Exited).await;

    pool.shutdown().await;
}

// === Messages: multicast + replay ===

#[tokio::test]
async fn test_messages_fan_out_and_replay_latest() {
    let adapter = ManualAdapter::arc();
    let pool = Pool::new(PoolConfig::with_capacity(1), adapter.clone());

    let t1 = pool.submit(TaskDescriptor::new("t1", ""));
    let s1 = adapter.sink("t1").await;
    s1.ready();
    s1.data("frame 1");

    let mut a = t1.messages();
    let mut b = t1.messages();
    assert_eq!(a.recv().await.as_deref(), Some("frame 1"));
    assert_eq!(b.recv().await.as_deref(), Some("frame 1"));

    s1.data("frame 2");
    assert_eq!(a.recv().await.as_deref(), Some("frame 2"));
    assert_eq!(b.recv().await.as_deref(), Some("frame 2"));

    s1.exited(0);
    wait_for_state(&t1, TaskState::Exited).await;

    // Late message subscriber sees only the latest payload.
    let mut late = t1.messages();
    assert_eq!(late.recv().await.as_deref(), Some("frame 2"));
    assert_eq!(late.recv().await, None);

    pool.shutdown().await;
}

// === Pool events ===

#[tokio::test]
async fn test_bus_reports_lifecycle_in_sequence_order() {
    let adapter = ManualAdapter::arc();
    let pool = Pool::new(PoolConfig::with_capacity(1), adapter.clone());
    let mut events = pool.events();

    let t1 = pool.submit(TaskDescriptor::new("t1", "").with_label("demo"));
    let s1 = adapter.sink("t1").await;
    s1.ready();
    s1.exited(0);
    wait_for_state(&t1, TaskState::Exited).await;

    let mut kinds = Vec::new();
    let mut last_seq = None;
    while kinds.len() < 4 {
        let ev = tokio::time::timeout(TICK, events.recv())
            .await
            .expect("timed out waiting for events")
            .expect("bus closed");
        if let Some(prev) = last_seq {
            assert!(ev.seq > prev, "sequence must increase");
        }
        last_seq = Some(ev.seq);
        kinds.push(ev.kind);
    }

    assert_eq!(
        kinds,
        [
            EventKind::TaskSubmitted,
            EventKind::TaskAdmitted,
            EventKind::TaskOnline,
            EventKind::TaskExited
        ]
    );
    pool.shutdown().await;
}

// === Shutdown abandons queued entries ===

#[tokio::test]
async fn test_shutdown_closes_queued_channels_with_reason() {
    let adapter = ManualAdapter::arc();
    let pool = Pool::new(PoolConfig::with_capacity(1), adapter.clone());

    let t1 = pool.submit(TaskDescriptor::new("t1", ""));
    let t2 = pool.submit(TaskDescriptor::new("t2", ""));
    wait_for_state(&t1, TaskState::Starting).await;

    pool.shutdown().await;

    // The queued entry never started; its stream ends at the seed.
    let states = drain_states(t2.state()).await;
    assert_eq!(states, [TaskState::Queued]);
    assert_eq!(t2.failure().as_deref(), Some("pool is shut down"));
}
