// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Revision Store (C2): a thin async wrapper around the `git` CLI,
//! grounded in the teacher's `TmuxAdapter` idiom (precondition checks,
//! structured `tracing` on stderr, a domain error enum rather than raw
//! `io::Error`) and in the original's `ring0/git_manager.py` semantics.
//! Commit authorship is pinned to `Protea <protea@localhost>` so history is
//! attributable to the supervisor rather than the ambient git config.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use protea_core::RevisionId;

#[derive(Debug, Error)]
pub enum RevisionError {
    #[error("git command failed: {0}")]
    CommandFailed(String),
    #[error("unexpected git output: {0}")]
    UnexpectedOutput(String),
}

const GIT_ENV: [(&str, &str); 4] = [
    ("GIT_AUTHOR_NAME", "Protea"),
    ("GIT_AUTHOR_EMAIL", "protea@localhost"),
    ("GIT_COMMITTER_NAME", "Protea"),
    ("GIT_COMMITTER_EMAIL", "protea@localhost"),
];

/// Snapshot and rollback over the worker's mutable source tree.
#[async_trait]
pub trait RevisionStore: Send + Sync + 'static {
    /// Initialize the git repository if one doesn't already exist.
    async fn init_repo(&self) -> Result<(), RevisionError>;

    /// Current HEAD commit hash.
    async fn current_hash(&self) -> Result<RevisionId, RevisionError>;

    /// Stage and commit everything under the worker directory. Returns the
    /// current HEAD hash unchanged if there is nothing to commit.
    async fn snapshot(&self, message: &str) -> Result<RevisionId, RevisionError>;

    /// Restore the working tree to `revision` without moving HEAD, removing
    /// any files added since that revision.
    async fn rollback(&self, revision: &RevisionId) -> Result<(), RevisionError>;

    /// The last `n` commits as `(revision, message)` pairs, most recent first.
    async fn history(&self, n: u32) -> Result<Vec<(RevisionId, String)>, RevisionError>;
}

/// Git-CLI-backed revision store, scoped to a single worker directory.
#[derive(Clone)]
pub struct GitRevisionStore {
    repo_path: std::path::PathBuf,
}

impl GitRevisionStore {
    pub fn new(repo_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String, RevisionError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .envs(GIT_ENV)
            .output()
            .await
            .map_err(|e| RevisionError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(args = ?args, stderr = %stderr, "git command failed");
            return Err(RevisionError::CommandFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl RevisionStore for GitRevisionStore {
    async fn init_repo(&self) -> Result<(), RevisionError> {
        if self.repo_path.join(".git").is_dir() {
            return Ok(());
        }
        tokio::fs::create_dir_all(&self.repo_path)
            .await
            .map_err(|e| RevisionError::CommandFailed(e.to_string()))?;
        self.run(&["init"]).await?;
        self.run(&["checkout", "-b", "main"]).await?;
        Ok(())
    }

    async fn current_hash(&self) -> Result<RevisionId, RevisionError> {
        let out = self.run(&["rev-parse", "HEAD"]).await?;
        Ok(RevisionId::new(out))
    }

    async fn snapshot(&self, message: &str) -> Result<RevisionId, RevisionError> {
        self.run(&["add", "-A"]).await?;
        let status = self.run(&["status", "--porcelain"]).await?;
        if status.is_empty() {
            return self.current_hash().await;
        }
        self.run(&["commit", "-m", message]).await?;
        self.current_hash().await
    }

    async fn rollback(&self, revision: &RevisionId) -> Result<(), RevisionError> {
        self.run(&["reset", revision.as_str(), "--", "."]).await?;
        self.run(&["checkout", "--", "."]).await?;
        self.run(&["clean", "-fd"]).await?;
        Ok(())
    }

    async fn history(&self, n: u32) -> Result<Vec<(RevisionId, String)>, RevisionError> {
        let count = format!("-{n}");
        let out = self.run(&["log", &count, "--pretty=format:%H%x00%s"]).await?;
        let mut entries = Vec::new();
        for line in out.lines() {
            let Some((hash, msg)) = line.split_once('\0') else {
                continue;
            };
            entries.push((RevisionId::new(hash), msg.to_string()));
        }
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "revision_tests.rs"]
mod tests;
