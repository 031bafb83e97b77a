use std::time::Duration;

use protea_core::FakeClock;

use super::*;

fn write_heartbeat(dir: &std::path::Path, pid: u32, timestamp: f64) -> PathBuf {
    let path = dir.join(".heartbeat");
    std::fs::write(&path, protea_core::format_heartbeat(pid, timestamp)).expect("write heartbeat");
    path
}

#[test]
fn missing_file_is_not_alive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let monitor = HeartbeatMonitor::with_clock(dir.path().join("nope"), 30.0, FakeClock::new(100.0));
    assert!(!monitor.is_alive());
}

#[test]
fn fresh_heartbeat_of_current_process_is_alive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pid = std::process::id();
    let clock = FakeClock::new(1_000.0);
    let path = write_heartbeat(dir.path(), pid, 990.0);
    let monitor = HeartbeatMonitor::with_clock(path, 30.0, clock);
    assert!(monitor.is_alive());
}

#[test]
fn stale_heartbeat_is_not_alive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pid = std::process::id();
    let clock = FakeClock::new(1_000.0);
    let path = write_heartbeat(dir.path(), pid, 900.0);
    let monitor = HeartbeatMonitor::with_clock(path, 30.0, clock);
    assert!(!monitor.is_alive());
}

#[test]
fn fresh_heartbeat_of_dead_pid_is_not_alive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = FakeClock::new(1_000.0);
    // PID 1 is init/launchd on most systems we don't own, but an
    // unreasonably large PID is guaranteed not to exist.
    let path = write_heartbeat(dir.path(), 999_999_999, 990.0);
    let monitor = HeartbeatMonitor::with_clock(path, 30.0, clock);
    assert!(!monitor.is_alive());
}

#[test]
fn malformed_content_is_not_alive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(".heartbeat");
    std::fs::write(&path, "not a heartbeat\n").expect("write");
    let monitor = HeartbeatMonitor::with_clock(path, 30.0, FakeClock::new(0.0));
    assert!(!monitor.is_alive());
}

#[tokio::test]
async fn wait_for_heartbeat_returns_true_once_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pid = std::process::id();
    let path = dir.path().join(".heartbeat");
    let monitor = std::sync::Arc::new(HeartbeatMonitor::with_clock(
        path.clone(),
        30.0,
        FakeClock::new(1_000.0),
    ));

    let writer = {
        let monitor = monitor.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            std::fs::write(monitor.path(), protea_core::format_heartbeat(pid, 1_000.0)).expect("write");
        })
    };

    let alive = monitor.wait_for_heartbeat(Duration::from_secs(5)).await;
    writer.await.expect("writer task");
    assert!(alive);
}

#[tokio::test]
async fn wait_for_heartbeat_times_out_when_never_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let monitor = HeartbeatMonitor::with_clock(dir.path().join("nope"), 30.0, FakeClock::new(0.0));
    let alive = monitor.wait_for_heartbeat(Duration::from_millis(100)).await;
    assert!(!alive);
}
