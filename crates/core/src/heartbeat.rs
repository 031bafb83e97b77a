// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The heartbeat wire format: two newline-terminated lines, `<pid>\n<unix
//! seconds as float>\n`. Parsing and freshness are pure functions; the
//! process-liveness probe and the poll loop live in `protea-adapters`
//! since they need an OS-level PID check and an async runtime.

/// A parsed heartbeat reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heartbeat {
    pub pid: u32,
    pub timestamp: f64,
}

/// Parse the two-line heartbeat format. Returns `None` on any malformed
/// content rather than propagating an error — per the contract, malformed
/// content is treated identically to "not alive".
pub fn parse_heartbeat(text: &str) -> Option<Heartbeat> {
    let mut lines = text.trim().lines();
    let pid_line = lines.next()?;
    let ts_line = lines.next()?;
    let pid: u32 = pid_line.trim().parse().ok()?;
    let timestamp: f64 = ts_line.trim().parse().ok()?;
    Some(Heartbeat { pid, timestamp })
}

/// Render the two-line heartbeat format for a given pid and timestamp.
pub fn format_heartbeat(pid: u32, timestamp: f64) -> String {
    format!("{pid}\n{timestamp}\n")
}

/// Whether a heartbeat with the given `timestamp` is still fresh at `now`,
/// given `timeout_sec`.
pub fn is_fresh(timestamp: f64, now: f64, timeout_sec: f64) -> bool {
    now - timestamp <= timeout_sec
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
