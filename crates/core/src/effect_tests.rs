use super::*;
use std::collections::HashMap;

#[test]
fn spawn_worker_reports_env_key_count() {
    let mut env = HashMap::new();
    env.insert("WORKER_HEARTBEAT".to_string(), "/tmp/hb".to_string());
    let eff = Effect::SpawnWorker {
        generation: GenerationId(4),
        env,
    };
    assert_eq!(eff.name(), "spawn_worker");
    assert!(eff.fields().iter().any(|(k, v)| *k == "env_keys" && v == "1"));
}

#[test]
fn rollback_reports_short_revision() {
    let eff = Effect::RollbackRevision {
        generation: GenerationId(1),
        revision: RevisionId::new("0123456789abcdef"),
    };
    let fields = eff.fields();
    let (_, revision_field) = fields.iter().find(|(k, _)| *k == "revision").expect("field present");
    assert_eq!(revision_field, "0123456789ab");
}

#[test]
fn emit_field_delegates_to_event_summary() {
    let eff = Effect::Emit {
        event: Event::Shutdown,
    };
    assert_eq!(eff.fields(), vec![("event", "supervisor shutting down".to_string())]);
}
