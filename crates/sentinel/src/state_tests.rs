use std::time::Duration;

use protea_core::{GenerationId, Task};

use super::*;

#[test]
fn snapshot_reflects_progress_and_outcome_updates() {
    let (state, _rx) = SharedState::new(100.0);
    state.update_progress(GenerationId(3), true, 0.2, 300);
    state.record_outcome(0.75, true);

    let snap = state.snapshot();
    assert_eq!(snap.generation_id, GenerationId(3));
    assert!(snap.alive);
    assert_eq!(snap.mutation_rate, 0.2);
    assert_eq!(snap.max_runtime_sec, 300);
    assert_eq!(snap.last_score, 0.75);
    assert!(snap.last_survived);
}

#[test]
fn pause_is_level_triggered() {
    let (state, _rx) = SharedState::new(0.0);
    assert!(!state.is_paused());
    state.set_pause(true);
    assert!(state.is_paused());
    assert!(state.snapshot().paused);
    state.set_pause(false);
    assert!(!state.is_paused());
}

#[test]
fn kill_is_edge_triggered_and_consumed_once() {
    let (state, _rx) = SharedState::new(0.0);
    state.request_kill();
    assert!(state.take_kill());
    assert!(!state.take_kill());
}

#[test]
fn p0_active_is_observable_via_snapshot() {
    let (state, _rx) = SharedState::new(0.0);
    assert!(!state.snapshot().p0_active);
    state.set_p0_active(true);
    assert!(state.snapshot().p0_active);
}

#[tokio::test]
async fn wait_for_kill_or_resolves_early_on_kill_request() {
    let (state, _rx) = SharedState::new(0.0);
    let state2 = state.clone();
    let waiter = tokio::spawn(async move {
        let start = tokio::time::Instant::now();
        state2.wait_for_kill_or(Duration::from_secs(60)).await;
        start.elapsed()
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    state.request_kill();

    let elapsed = waiter.await.expect("waiter task");
    assert!(elapsed < Duration::from_secs(1));
}

#[test]
fn directive_is_consumed_exactly_once() {
    let (state, _rx) = SharedState::new(0.0);
    assert_eq!(state.take_directive(), None);

    state.set_directive("make a snake game".to_string());
    assert_eq!(state.take_directive(), Some("make a snake game".to_string()));
    assert_eq!(state.take_directive(), None);
}

#[test]
fn set_directive_overwrites_a_still_pending_directive() {
    let (state, _rx) = SharedState::new(0.0);
    state.set_directive("first".to_string());
    state.set_directive("second".to_string());
    assert_eq!(state.take_directive(), Some("second".to_string()));
}

#[tokio::test]
async fn enqueued_tasks_are_received_fifo() {
    let (state, mut rx) = SharedState::new(0.0);
    state.enqueue_task(Task::new("t-1", "first", "chat", 0.0));
    state.enqueue_task(Task::new("t-2", "second", "chat", 0.0));

    let first = rx.recv().await.expect("task");
    let second = rx.recv().await.expect("task");
    assert_eq!(first.text, "first");
    assert_eq!(second.text, "second");
}
