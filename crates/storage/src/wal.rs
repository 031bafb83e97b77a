// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL write-ahead log for fitness entries, with the same group-commit
//! and corruption-recovery shape as the teacher's job-event WAL, scaled
//! down for a log that is appended to once per generation rather than
//! once per job event.
//!
//! Each line is a single JSON-encoded [`FitnessEntry`].

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::warn;

use crate::fitness::FitnessEntry;

/// Flush interval for group commit, kept for parity with the teacher's WAL
/// even though fitness writes are infrequent enough that callers flush
/// immediately after every append.
const FLUSH_INTERVAL: Duration = Duration::from_millis(10);
const FLUSH_THRESHOLD: usize = 100;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct Wal {
    file: File,
    path: PathBuf,
    write_buffer: Vec<Vec<u8>>,
    last_flush: Instant,
}

impl Wal {
    /// Open or create the WAL at `path`. A corrupt trailing entry is
    /// rotated to `.bak`, preserving every entry parsed before it, mirroring
    /// the teacher's scan-then-rotate recovery.
    pub fn open(path: &Path) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).read(true).append(true).open(path)?;

        if Self::scan_is_corrupt(&file)? {
            let valid = Self::read_valid_lines(&file)?;
            drop(file);
            let bak_path = rotate_bak_path(path);
            warn!(
                path = %path.display(),
                bak = %bak_path.display(),
                valid_entries = valid.len(),
                "corrupt fitness WAL, rotating to .bak and preserving valid entries",
            );
            fs::rename(path, &bak_path)?;

            let mut new_file = File::create(path)?;
            for line in &valid {
                new_file.write_all(line.as_bytes())?;
                new_file.write_all(b"\n")?;
            }
            new_file.sync_all()?;
        }

        let file = OpenOptions::new().create(true).read(true).append(true).open(path)?;

        Ok(Self {
            file,
            path: path.to_owned(),
            write_buffer: Vec::new(),
            last_flush: Instant::now(),
        })
    }

    fn scan_is_corrupt(file: &File) -> Result<bool, WalError> {
        let mut reader = BufReader::new(file.try_clone()?);
        reader.seek(SeekFrom::Start(0))?;
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => return Ok(false),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::InvalidData => return Ok(true),
                Err(e) => return Err(e.into()),
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if serde_json::from_str::<FitnessEntry>(trimmed).is_err() {
                return Ok(true);
            }
        }
    }

    fn read_valid_lines(file: &File) -> Result<Vec<String>, WalError> {
        let mut reader = BufReader::new(file.try_clone()?);
        reader.seek(SeekFrom::Start(0))?;
        let mut valid = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::InvalidData => break,
                Err(e) => return Err(e.into()),
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if serde_json::from_str::<FitnessEntry>(trimmed).is_err() {
                break;
            }
            valid.push(trimmed.to_string());
        }
        Ok(valid)
    }

    /// Buffer an entry for the next flush.
    pub fn append(&mut self, entry: &FitnessEntry) -> Result<(), WalError> {
        self.write_buffer.push(serde_json::to_vec(entry)?);
        Ok(())
    }

    /// Whether the interval has elapsed or the buffer is full — kept for
    /// callers that want to batch rather than flush on every append.
    pub fn needs_flush(&self) -> bool {
        !self.write_buffer.is_empty()
            && (self.last_flush.elapsed() >= FLUSH_INTERVAL || self.write_buffer.len() >= FLUSH_THRESHOLD)
    }

    /// Flush all buffered entries to disk with a single fsync.
    pub fn flush(&mut self) -> Result<(), WalError> {
        if self.write_buffer.is_empty() {
            return Ok(());
        }
        for mut json_bytes in self.write_buffer.drain(..) {
            json_bytes.push(b'\n');
            self.file.write_all(&json_bytes)?;
        }
        self.file.sync_all()?;
        self.last_flush = Instant::now();
        Ok(())
    }

    /// Replay every entry currently on disk, in file order.
    pub fn replay(&mut self) -> Result<Vec<FitnessEntry>, WalError> {
        self.flush()?;
        let mut reader = BufReader::new(self.file.try_clone()?);
        reader.seek(SeekFrom::Start(0))?;
        let mut entries = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::InvalidData => break,
                Err(e) => return Err(e.into()),
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(trimmed)?);
        }
        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
