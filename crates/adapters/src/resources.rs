// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource Monitor: a soft, non-fatal per-tick check against the
//! `[resources]` ceilings, grounded in the original's `ring0/resource_monitor`
//! (a single-read `/proc` sampler, not a continuously-running collector).
//!
//! CPU percent is approximated from the 1-minute load average rather than a
//! delta of two `/proc/stat` snapshots, since the kernel calls this once per
//! tick and a blocking sample-sleep-sample pair has no place in that loop.
//! Non-Linux platforms read as all-zero rather than failing the tick.

use std::path::Path;

use protea_core::ResourceConfig;

#[cfg(target_os = "linux")]
fn cpu_percent() -> f64 {
    let Ok(loadavg) = std::fs::read_to_string("/proc/loadavg") else {
        return 0.0;
    };
    let Some(one_min) = loadavg.split_whitespace().next().and_then(|s| s.parse::<f64>().ok()) else {
        return 0.0;
    };
    let cpus = std::thread::available_parallelism().map(std::num::NonZeroUsize::get).unwrap_or(1) as f64;
    ((one_min / cpus) * 100.0).min(100.0)
}

#[cfg(not(target_os = "linux"))]
fn cpu_percent() -> f64 {
    0.0
}

#[cfg(target_os = "linux")]
fn memory_percent() -> f64 {
    let Ok(meminfo) = std::fs::read_to_string("/proc/meminfo") else {
        return 0.0;
    };
    let mut total_kb = None;
    let mut available_kb = None;
    for line in meminfo.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total_kb = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            available_kb = parse_kb(rest);
        }
    }
    match (total_kb, available_kb) {
        (Some(total), Some(available)) if total > 0.0 => ((total - available) / total * 100.0).clamp(0.0, 100.0),
        _ => 0.0,
    }
}

#[cfg(target_os = "linux")]
fn parse_kb(field: &str) -> Option<f64> {
    field.trim().split_whitespace().next()?.parse::<f64>().ok()
}

#[cfg(not(target_os = "linux"))]
fn memory_percent() -> f64 {
    0.0
}

fn disk_percent(path: &Path) -> f64 {
    match (fs2::total_space(path), fs2::available_space(path)) {
        (Ok(total), Ok(available)) if total > 0 => {
            (total.saturating_sub(available) as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}

/// A single sample against the configured ceilings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSample {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

impl ResourceSample {
    /// Take a fresh sample, checking disk usage at `disk_path`.
    pub fn take(disk_path: &Path) -> Self {
        Self {
            cpu_percent: cpu_percent(),
            memory_percent: memory_percent(),
            disk_percent: disk_percent(disk_path),
        }
    }

    /// `None` if every reading is within `limits`; otherwise a human-readable
    /// summary of which ceilings were exceeded, suitable for a warning log.
    pub fn check(&self, limits: &ResourceConfig) -> Option<String> {
        let mut alerts = Vec::new();
        if self.cpu_percent > limits.max_cpu_percent {
            alerts.push(format!("CPU {:.0}% > {:.0}%", self.cpu_percent, limits.max_cpu_percent));
        }
        if self.memory_percent > limits.max_memory_percent {
            alerts.push(format!("memory {:.0}% > {:.0}%", self.memory_percent, limits.max_memory_percent));
        }
        if self.disk_percent > limits.max_disk_percent {
            alerts.push(format!("disk {:.0}% > {:.0}%", self.disk_percent, limits.max_disk_percent));
        }
        if alerts.is_empty() {
            None
        } else {
            Some(alerts.join("; "))
        }
    }
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;
