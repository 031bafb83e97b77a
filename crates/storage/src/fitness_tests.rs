use super::*;

fn rev(s: &str) -> RevisionId {
    RevisionId::new(s)
}

#[test]
fn record_assigns_increasing_ids() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut log = FitnessLog::open(&dir.path().join("fitness.jsonl")).expect("open");
    let id1 = log.record(GenerationId(0), rev("a"), 0.3, 100.0, false).expect("record");
    let id2 = log.record(GenerationId(1), rev("b"), 0.8, 200.0, true).expect("record");
    assert_eq!(id1, 1);
    assert_eq!(id2, 2);
}

#[test]
fn top_orders_by_score_descending() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut log = FitnessLog::open(&dir.path().join("fitness.jsonl")).expect("open");
    log.record(GenerationId(0), rev("a"), 0.3, 100.0, true).expect("record");
    log.record(GenerationId(1), rev("b"), 0.9, 100.0, true).expect("record");
    log.record(GenerationId(2), rev("c"), 0.6, 100.0, true).expect("record");

    let top = log.top(2);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].score, 0.9);
    assert_eq!(top[1].score, 0.6);
}

#[test]
fn history_orders_by_id_descending() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut log = FitnessLog::open(&dir.path().join("fitness.jsonl")).expect("open");
    log.record(GenerationId(0), rev("a"), 0.1, 10.0, true).expect("record");
    log.record(GenerationId(1), rev("b"), 0.2, 10.0, true).expect("record");

    let history = log.history(50);
    assert_eq!(history[0].id, 2);
    assert_eq!(history[1].id, 1);
}

#[test]
fn generation_stats_aggregate_correctly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut log = FitnessLog::open(&dir.path().join("fitness.jsonl")).expect("open");
    log.record(GenerationId(0), rev("a"), 0.4, 10.0, true).expect("record");
    log.record(GenerationId(0), rev("a"), 0.6, 10.0, true).expect("record");

    let stats = log.generation_stats(GenerationId(0)).expect("stats present");
    assert_eq!(stats.count, 2);
    assert!((stats.avg_score - 0.5).abs() < 1e-9);
    assert_eq!(stats.max_score, 0.6);
    assert_eq!(stats.min_score, 0.4);
}

#[test]
fn generation_stats_none_for_unknown_generation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = FitnessLog::open(&dir.path().join("fitness.jsonl")).expect("open");
    assert!(log.generation_stats(GenerationId(99)).is_none());
}

#[test]
fn is_plateaued_false_before_window_fills() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut log = FitnessLog::open(&dir.path().join("fitness.jsonl")).expect("open");
    log.record(GenerationId(0), rev("a"), 0.5, 10.0, true).expect("record");
    assert!(!log.is_plateaued(3));
}

#[test]
fn is_plateaued_true_when_recent_survived_scores_are_flat() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut log = FitnessLog::open(&dir.path().join("fitness.jsonl")).expect("open");
    for _ in 0..3 {
        log.record(GenerationId(0), rev("a"), 0.701, 10.0, true).expect("record");
    }
    assert!(log.is_plateaued(3));
}

#[test]
fn is_plateaued_ignores_unsurvived_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut log = FitnessLog::open(&dir.path().join("fitness.jsonl")).expect("open");
    log.record(GenerationId(0), rev("a"), 0.0, 10.0, false).expect("record");
    log.record(GenerationId(1), rev("b"), 0.701, 10.0, true).expect("record");
    log.record(GenerationId(2), rev("c"), 0.702, 10.0, true).expect("record");
    log.record(GenerationId(3), rev("d"), 0.700, 10.0, true).expect("record");
    assert!(log.is_plateaued(3));
}

#[test]
fn reopen_replays_prior_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fitness.jsonl");
    {
        let mut log = FitnessLog::open(&path).expect("open");
        log.record(GenerationId(0), rev("a"), 0.5, 10.0, true).expect("record");
    }
    let log = FitnessLog::open(&path).expect("reopen");
    assert_eq!(log.history(10).len(), 1);
}
