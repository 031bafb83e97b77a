//! End-to-end supervisor lifecycle: start the worker, observe a live
//! heartbeat, then shut down cleanly on `Ctrl-C`.
//!
//! The worker script never finishes on its own and `max_runtime_sec` is
//! generated in the 240-360s range, so the generation stays in its
//! `RUNNING` tick for the whole test — it never reaches the evolution
//! step, which would otherwise attempt a real network call to the Claude
//! API.

use crate::prelude::*;

#[test]
fn supervisor_starts_worker_and_shuts_down_cleanly_on_interrupt() {
    let project = Project::minimal();

    let mut child = project.protea().args(&["run"]).spawn();

    let heartbeat_path = project.heartbeat_path();
    let started = wait_for(SPEC_WAIT_MAX_MS, || heartbeat_path.exists());
    assert!(started, "worker heartbeat file never appeared");

    interrupt(&child);

    let status = wait_for_exit(&mut child, 5_000).unwrap_or_else(|| {
        let _ = child.kill();
        panic!("protea run did not exit after SIGINT");
    });
    assert!(status.success(), "expected a clean exit after SIGINT, got {status:?}");
}

#[test]
fn worker_process_is_gone_after_shutdown() {
    let project = Project::minimal();
    let mut child = project.protea().args(&["run"]).spawn();

    let heartbeat_path = project.heartbeat_path();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || heartbeat_path.exists()), "worker heartbeat file never appeared");

    let worker_pid = protea_core::parse_heartbeat(&std::fs::read_to_string(&heartbeat_path).expect("read heartbeat"))
        .expect("heartbeat should parse")
        .pid;
    assert!(pid_alive(worker_pid), "worker should be alive before shutdown");

    interrupt(&child);
    let status = wait_for_exit(&mut child, 5_000).unwrap_or_else(|| {
        let _ = child.kill();
        panic!("protea run did not exit after SIGINT");
    });
    assert!(status.success());

    assert!(
        wait_for(1_000, || !pid_alive(worker_pid)),
        "worker process should be stopped once the supervisor has exited"
    );
}

fn pid_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    kill(Pid::from_raw(pid as i32), None).is_ok()
}
