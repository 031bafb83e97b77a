// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time abstraction so generation timing, heartbeat freshness, and plateau
//! detection never call `SystemTime::now()` directly.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of wall-clock time.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Current Unix time in fractional seconds.
    fn now(&self) -> f64;
}

/// Production clock backed by `SystemTime::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Deterministic clock for tests. Starts at a fixed instant and only moves
/// when `advance`/`set` is called.
#[derive(Debug, Clone)]
pub struct FakeClock {
    // Stored as millis in a shared atomic so clones observe the same clock.
    millis: std::sync::Arc<AtomicI64>,
}

impl FakeClock {
    pub fn new(start: f64) -> Self {
        Self {
            millis: std::sync::Arc::new(AtomicI64::new((start * 1000.0) as i64)),
        }
    }

    pub fn advance(&self, secs: f64) {
        self.millis
            .fetch_add((secs * 1000.0) as i64, Ordering::SeqCst);
    }

    pub fn set(&self, value: f64) {
        self.millis.store((value * 1000.0) as i64, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clock for FakeClock {
    fn now(&self) -> f64 {
        self.millis.load(Ordering::SeqCst) as f64 / 1000.0
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
