//! Test helpers for behavioral specifications.
//!
//! Black-box DSL for driving the `protea` CLI binary.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;

pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

/// A worker script that writes a fresh heartbeat once a second until
/// killed. `$$` is the shell's own pid, matching what `ProcessWorkerLifecycle`
/// reports back to the kernel since the command is launched directly
/// (no exec, no subshell).
pub const MINIMAL_WORKER_SCRIPT: &str = r#"#!/bin/sh
while true; do
  printf '%s\n%s\n' "$$" "$(date +%s)" > "$WORKER_HEARTBEAT"
  sleep 1
done
"#;

/// Returns the path to a binary, checking the llvm-cov target directory
/// first, then falling back to resolving relative to the test binary
/// itself when `CARGO_MANIFEST_DIR` is stale.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

fn protea_binary() -> PathBuf {
    binary_path("protea")
}

/// Create a CLI builder for `protea` commands.
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: Vec::new(),
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().to_string()));
        self
    }

    pub fn command(self) -> Command {
        let mut cmd = Command::new(protea_binary());
        cmd.args(&self.args);
        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        // Never let the test runner's own credentials leak into a spec
        // that's deliberately exercising the no-API-key startup path.
        cmd.env_remove("CLAUDE_API_KEY");
        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run and expect success (exit code 0).
    pub fn passes(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect failure (non-zero exit code).
    pub fn fails(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Spawn in the background without waiting for it to exit.
    pub fn spawn(self) -> Child {
        self.command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("command should spawn")
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain '{expected}'\nstdout: {stdout}");
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(expected), "stderr does not contain '{expected}'\nstderr: {stderr}");
        self
    }
}

/// Poll a condition until it returns true or the timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll_interval = Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

/// A temporary supervised project: config, worker source tree, and an
/// isolated state directory so parallel tests never collide.
pub struct Project {
    dir: tempfile::TempDir,
    state_dir: tempfile::TempDir,
}

const MINIMAL_CONFIG: &str = r#"
[worker]
path = "worker"
command = ["sh", "worker.sh"]
heartbeat_interval_sec = 1
heartbeat_timeout_sec = 5

[evolution]
seed = 1

[resources]
max_cpu_percent = 100.0
max_memory_percent = 100.0
max_disk_percent = 100.0

[chat]
enabled = false

[portal]
enabled = false
"#;

impl Project {
    /// A project with a minimal valid `config.toml` and a worker that
    /// heartbeats every second without ever finishing on its own.
    pub fn minimal() -> Self {
        let project = Self {
            dir: tempfile::tempdir().expect("tempdir"),
            state_dir: tempfile::tempdir().expect("tempdir"),
        };
        project.file("config/config.toml", MINIMAL_CONFIG);
        project.write_worker_script(MINIMAL_WORKER_SCRIPT);
        project
    }

    /// A project with no `config/config.toml` at all.
    pub fn without_config() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
            state_dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.dir.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(full_path, content).expect("write file");
    }

    fn write_worker_script(&self, script: &str) {
        let path = self.dir.path().join("worker/worker.sh");
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create worker dir");
        let mut handle = std::fs::File::create(&path).expect("create worker script");
        handle.write_all(script.as_bytes()).expect("write worker script");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path).expect("stat worker script").permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).expect("chmod worker script");
        }
    }

    pub fn heartbeat_path(&self) -> PathBuf {
        self.state_dir.path().join("heartbeat")
    }

    /// A `CliBuilder` scoped to this project: working directory, isolated
    /// state directory, and a non-empty (but non-functional) Claude API
    /// key so `ClaudeClient::new` doesn't fail synchronously at startup.
    pub fn protea(&self) -> CliBuilder {
        cli()
            .pwd(self.path())
            .env("PROTEA_STATE_DIR", self.state_path().to_string_lossy())
            .env("CLAUDE_API_KEY", "spec-test-key-not-a-real-credential")
    }
}

/// Send `SIGINT` to a running `protea` child, mirroring the `Ctrl-C`
/// the CLI listens for.
pub fn interrupt(child: &Child) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    let _ = kill(Pid::from_raw(child.id() as i32), Signal::SIGINT);
}

/// Wait for a spawned child to exit within `timeout_ms`, returning its
/// status if it did.
pub fn wait_for_exit(child: &mut Child, timeout_ms: u64) -> Option<std::process::ExitStatus> {
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    loop {
        if let Ok(Some(status)) = child.try_wait() {
            return Some(status);
        }
        if start.elapsed() >= timeout {
            return None;
        }
        std::thread::sleep(Duration::from_millis(SPEC_POLL_INTERVAL_MS));
    }
}
