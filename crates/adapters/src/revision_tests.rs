use super::*;

async fn write_file(dir: &Path, name: &str, contents: &str) {
    tokio::fs::write(dir.join(name), contents).await.expect("write file");
}

#[tokio::test]
async fn init_repo_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = GitRevisionStore::new(dir.path());
    store.init_repo().await.expect("init");
    store.init_repo().await.expect("init again");
    assert!(dir.path().join(".git").is_dir());
}

#[tokio::test]
async fn snapshot_with_no_changes_returns_same_hash() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = GitRevisionStore::new(dir.path());
    store.init_repo().await.expect("init");
    write_file(dir.path(), "main.py", "print('hello')\n").await;
    let first = store.snapshot("gen-0 seed").await.expect("snapshot");
    let second = store.snapshot("gen-0 seed, again").await.expect("no-op snapshot");
    assert_eq!(first, second);
}

#[tokio::test]
async fn rollback_restores_tracked_file_and_removes_new_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = GitRevisionStore::new(dir.path());
    store.init_repo().await.expect("init");
    write_file(dir.path(), "main.py", "version = 1\n").await;
    let good = store.snapshot("gen-0").await.expect("snapshot");

    write_file(dir.path(), "main.py", "version = 2\n").await;
    write_file(dir.path(), "extra.py", "oops\n").await;
    store.snapshot("gen-1 broken").await.expect("snapshot");

    store.rollback(&good).await.expect("rollback");

    let contents = tokio::fs::read_to_string(dir.path().join("main.py")).await.expect("read");
    assert_eq!(contents, "version = 1\n");
    assert!(!dir.path().join("extra.py").exists());
}

#[tokio::test]
async fn history_returns_most_recent_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = GitRevisionStore::new(dir.path());
    store.init_repo().await.expect("init");
    write_file(dir.path(), "main.py", "a\n").await;
    store.snapshot("first").await.expect("snapshot");
    write_file(dir.path(), "main.py", "b\n").await;
    store.snapshot("second").await.expect("snapshot");

    let history = store.history(10).await.expect("history");
    assert_eq!(history[0].1, "second");
    assert_eq!(history[1].1, "first");
}
