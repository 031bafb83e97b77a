// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor configuration: `config/config.toml` for tunables, environment
//! variables (and an optional `.env` file) for secrets. The split mirrors
//! the original implementation's `ring0`/`ring1` config loaders — tunables
//! are checked into the repo, secrets never are.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("PROTEA_STATE_DIR is unset and HOME could not be resolved")]
    NoStateDir,
}

/// `[worker]` table: how the supervised worker process is launched and
/// judged.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Directory (relative to the project root) containing the worker's
    /// mutable source tree.
    pub path: PathBuf,
    /// Command used to launch the worker, e.g. `["python3", "main.py"]`.
    pub command: Vec<String>,
    pub heartbeat_interval_sec: u32,
    pub heartbeat_timeout_sec: u32,
}

/// `[evolution]` table: mutation parameter seeding and LLM model selection.
#[derive(Debug, Clone, Deserialize)]
pub struct EvolutionConfig {
    pub seed: u64,
    #[serde(default = "default_model")]
    pub claude_model: String,
    #[serde(default = "default_max_tokens")]
    pub claude_max_tokens: u32,
    #[serde(default = "default_plateau_window")]
    pub plateau_window: u32,
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_plateau_window() -> u32 {
    5
}

/// `[resources]` table: soft host-resource ceilings checked once per tick.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    pub max_cpu_percent: f64,
    pub max_memory_percent: f64,
    pub max_disk_percent: f64,
}

/// `[fitness]` table: where the Fitness Log's append-only journal lives.
#[derive(Debug, Clone, Deserialize)]
pub struct FitnessConfig {
    #[serde(default = "default_fitness_db_path")]
    pub db_path: PathBuf,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            db_path: default_fitness_db_path(),
        }
    }
}

fn default_fitness_db_path() -> PathBuf {
    PathBuf::from("fitness.jsonl")
}

/// `[chat]` table: operator chat transport.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChatConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_prompt_history")]
    pub max_prompt_history: u32,
}

fn default_prompt_history() -> u32 {
    10
}

/// `[portal]` table: read-only web portal.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_portal_host")]
    pub host: String,
    #[serde(default = "default_portal_port")]
    pub port: u16,
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
    #[serde(default = "default_skill_catalog_path")]
    pub skill_catalog_path: PathBuf,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_portal_host(),
            port: default_portal_port(),
            reports_dir: default_reports_dir(),
            skill_catalog_path: default_skill_catalog_path(),
        }
    }
}

fn default_portal_host() -> String {
    "0.0.0.0".to_string()
}

fn default_portal_port() -> u16 {
    8420
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_skill_catalog_path() -> PathBuf {
    PathBuf::from("config/skills.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub worker: WorkerConfig,
    pub evolution: EvolutionConfig,
    pub resources: ResourceConfig,
    #[serde(default)]
    pub fitness: FitnessConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub portal: PortalConfig,
}

/// Secrets resolved from the environment, never from `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub claude_api_key: String,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
}

impl Secrets {
    /// Resolve secrets from the process environment only.
    pub fn from_env() -> Self {
        Self::resolve(&HashMap::new())
    }

    /// Resolve secrets from the process environment, falling back to a
    /// parsed `.env` file's entries for anything the environment doesn't
    /// already set. The process environment always wins.
    pub fn from_env_with_dotenv(project_root: &Path) -> Self {
        let dotenv = load_dotenv(project_root);
        Self::resolve(&dotenv)
    }

    fn resolve(dotenv: &HashMap<String, String>) -> Self {
        let lookup = |key: &str| {
            std::env::var(key)
                .ok()
                .or_else(|| dotenv.get(key).cloned())
                .unwrap_or_default()
        };
        Self {
            claude_api_key: lookup("CLAUDE_API_KEY"),
            telegram_bot_token: lookup("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: lookup("TELEGRAM_CHAT_ID"),
        }
    }
}

/// Resolve the supervisor's state directory:
/// `PROTEA_STATE_DIR` > `XDG_STATE_HOME/protea` > `~/.local/state/protea`.
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("PROTEA_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("protea"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/protea"))
}

/// Parse a simple `.env` file (`KEY=VALUE`, `#` comments, optional quoting)
/// under `project_root` into a map. Missing file yields an empty map.
pub fn load_dotenv(project_root: &Path) -> HashMap<String, String> {
    let env_path = project_root.join(".env");
    let Ok(contents) = std::fs::read_to_string(&env_path) else {
        return HashMap::new();
    };
    parse_dotenv(&contents)
}

fn parse_dotenv(contents: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let mut value = value.trim();
        if value.len() >= 2 {
            let first = value.as_bytes()[0];
            let last = value.as_bytes()[value.len() - 1];
            if first == last && (first == b'"' || first == b'\'') {
                value = &value[1..value.len() - 1];
            }
        }
        if !key.is_empty() && !value.is_empty() {
            out.insert(key.to_string(), value.to_string());
        }
    }
    out
}

impl Config {
    /// Load `config/config.toml` under `project_root`.
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        let path = project_root.join("config").join("config.toml");
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
