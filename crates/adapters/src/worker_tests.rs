use super::*;

#[tokio::test]
async fn start_fails_when_worker_dir_missing() {
    let lifecycle = ProcessWorkerLifecycle::new(vec!["true".to_string()]);
    let missing = Path::new("/nonexistent/protea-worker-test-dir");
    let err = lifecycle.start(missing, Path::new("/tmp/hb")).await.unwrap_err();
    assert!(matches!(err, WorkerError::MissingWorkerDir(_)));
}

#[tokio::test]
async fn start_and_stop_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let heartbeat = dir.path().join(".heartbeat");
    let lifecycle = ProcessWorkerLifecycle::new(vec!["sleep".to_string(), "30".to_string()]);

    let handle = lifecycle.start(dir.path(), &heartbeat).await.expect("start");
    assert!(handle.pid > 0);

    lifecycle.stop(Some(handle)).await;
}

#[tokio::test]
async fn stop_of_none_is_a_noop() {
    let lifecycle = ProcessWorkerLifecycle::default();
    lifecycle.stop(None).await;
}

#[tokio::test]
async fn crash_log_captures_stderr_tail() {
    let dir = tempfile::tempdir().expect("tempdir");
    let heartbeat = dir.path().join(".heartbeat");
    let lifecycle = ProcessWorkerLifecycle::new(vec![
        "sh".to_string(),
        "-c".to_string(),
        "echo boom >&2; sleep 30".to_string(),
    ]);

    let handle = lifecycle.start(dir.path(), &heartbeat).await.expect("start");

    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
    let mut found = handle.crash_log().content.contains("boom");
    while !found && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        found = handle.crash_log().content.contains("boom");
    }
    assert!(found, "expected captured stderr to contain 'boom'");

    lifecycle.stop(Some(handle)).await;
}
