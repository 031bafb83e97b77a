// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evolution intent classification and blast radius computation.
//!
//! Pure-function module — classifies why an evolution was triggered and
//! measures how much code changed between two source revisions.

use indexmap::IndexSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A single observed crash log entry.
#[derive(Debug, Clone, Default)]
pub struct CrashLog {
    pub content: String,
}

/// The classified reason for an evolution step, carrying the signals that
/// led to the classification. A tagged union rather than a string, so
/// downstream consumers match on it instead of comparing strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "lowercase")]
pub enum Intent {
    Adapt { signals: Vec<String> },
    Repair { signals: Vec<String> },
    Explore { signals: Vec<String> },
    Optimize { signals: Vec<String> },
}

impl Intent {
    pub fn signals(&self) -> &[String] {
        match self {
            Intent::Adapt { signals }
            | Intent::Repair { signals }
            | Intent::Explore { signals }
            | Intent::Optimize { signals } => signals,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Intent::Adapt { .. } => "adapt",
            Intent::Repair { .. } => "repair",
            Intent::Explore { .. } => "explore",
            Intent::Optimize { .. } => "optimize",
        }
    }
}

#[allow(clippy::expect_used)] // the pattern is a compile-time literal, never fails to compile
fn error_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(\w*Error|\w*Exception)\b").expect("static error pattern is valid")
    })
}

fn extract_error_signals(crash_logs: &[CrashLog]) -> Vec<String> {
    let mut seen = IndexSet::new();
    for log_entry in crash_logs.iter().take(3) {
        for capture in error_pattern().captures_iter(&log_entry.content) {
            if let Some(m) = capture.get(1) {
                seen.insert(m.as_str().to_string());
            }
        }
    }
    seen.into_iter().collect()
}

fn truncated(s: &str, n: usize) -> String {
    if s.len() <= n {
        s.to_string()
    } else {
        s.chars().take(n).collect()
    }
}

/// Classify evolution intent from available signals.
///
/// Priority order (first match wins):
/// 1. `directive` non-empty -> `Adapt`
/// 2. `survived = false` -> `Repair`
/// 3. `survived = true` and `persistent_errors` non-empty -> `Repair`
/// 4. `is_plateaued` -> `Explore`
/// 5. otherwise -> `Optimize`
pub fn classify_intent(
    survived: bool,
    is_plateaued: bool,
    persistent_errors: &[String],
    crash_logs: &[CrashLog],
    directive: &str,
) -> Intent {
    if !directive.is_empty() {
        let signals = vec![format!("directive: {}", truncated(directive, 80))];
        return Intent::Adapt { signals };
    }

    if !survived {
        let mut signals = extract_error_signals(crash_logs);
        signals.extend(persistent_errors.iter().take(3).map(|e| truncated(e, 120)));
        if signals.is_empty() {
            signals.push("crashed".to_string());
        }
        return Intent::Repair { signals };
    }

    if !persistent_errors.is_empty() {
        let signals = persistent_errors
            .iter()
            .take(3)
            .map(|e| truncated(e, 120))
            .collect();
        return Intent::Repair { signals };
    }

    if is_plateaued {
        return Intent::Explore {
            signals: vec!["plateau".to_string()],
        };
    }

    Intent::Optimize {
        signals: vec!["survived".to_string()],
    }
}

/// The scope of a source mutation, classified by line-change ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Minor,
    Moderate,
    Major,
    FullRewrite,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Minor => "minor",
            Scope::Moderate => "moderate",
            Scope::Major => "major",
            Scope::FullRewrite => "full_rewrite",
        }
    }
}

/// Line-diff-derived measure of how much a mutation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlastRadius {
    pub lines_changed: usize,
    pub lines_added: usize,
    pub lines_removed: usize,
    pub scope: Scope,
}

/// Compute the scope of code changes via a line diff.
///
/// `scope` classification: `minor` (ratio <= 0.1), `moderate` (<= 0.3),
/// `major` (<= 0.7), `full_rewrite` otherwise. The ratio denominator is
/// `max(old_lines, new_lines, 1)`.
pub fn blast_radius(old_source: &str, new_source: &str) -> BlastRadius {
    let old_lines: Vec<&str> = old_source.lines().collect();
    let new_lines: Vec<&str> = new_source.lines().collect();

    let diff = similar_line_diff(&old_lines, &new_lines);
    let lines_added = diff.added;
    let lines_removed = diff.removed;
    let lines_changed = lines_added + lines_removed;

    let total_lines = old_lines.len().max(new_lines.len()).max(1);
    let ratio = lines_changed as f64 / total_lines as f64;

    let scope = if ratio > 0.7 {
        Scope::FullRewrite
    } else if ratio > 0.3 {
        Scope::Major
    } else if ratio > 0.1 {
        Scope::Moderate
    } else {
        Scope::Minor
    };

    BlastRadius {
        lines_changed,
        lines_added,
        lines_removed,
        scope,
    }
}

struct LineDiffCounts {
    added: usize,
    removed: usize,
}

/// Myers-style longest-common-subsequence diff, counting added/removed
/// lines only (no need to materialize the edit script itself).
fn similar_line_diff(old: &[&str], new: &[&str]) -> LineDiffCounts {
    let n = old.len();
    let m = new.len();
    // lcs[i][j] = length of the LCS of old[i..] and new[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }
    let common = lcs[0][0];
    LineDiffCounts {
        added: m - common,
        removed: n - common,
    }
}

#[cfg(test)]
#[path = "intent_tests.rs"]
mod tests;
