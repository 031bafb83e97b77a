use super::*;

#[test]
fn starting_snapshot_is_not_alive() {
    let snap = SupervisorSnapshot::starting(GenerationId::ZERO, 0.0);
    assert!(!snap.alive);
    assert!(!snap.paused);
}

#[test]
fn markdown_reports_paused_over_alive() {
    let mut snap = SupervisorSnapshot::starting(GenerationId(3), 0.0);
    snap.alive = true;
    snap.paused = true;
    let md = snap.to_markdown(12.0);
    assert!(md.contains("PAUSED"));
    assert!(md.contains("Generation: 3"));
}

#[test]
fn markdown_reports_dead_when_not_alive_and_not_paused() {
    let snap = SupervisorSnapshot::starting(GenerationId::ZERO, 0.0);
    assert!(snap.to_markdown(0.0).contains("DEAD"));
}
