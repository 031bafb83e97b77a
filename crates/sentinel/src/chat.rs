// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Chat Operator (C9): long-polls a chat transport, authorizes
//! updates by chat id, and dispatches the fixed command table. Command
//! parsing is a pure function (`parse_command`) so the dispatch table is
//! testable without a live transport.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use protea_adapters::{next_offset, ChatTransport};
use protea_core::{Clock, IdGen, Task};
use protea_storage::{FitnessEntry, FitnessLog};

use crate::state::SharedState;

const CODE_REPLY_LIMIT: usize = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    History,
    Top,
    Code,
    Pause,
    Resume,
    Kill,
    Directive(String),
    Help,
    Task(String),
}

/// Strip an optional `@botname` suffix, match case-insensitively, and only
/// look at the first whitespace-delimited token. Any non-slash-prefixed
/// text (including empty text) is an operator task.
fn parse_command(text: &str) -> Command {
    let trimmed = text.trim();
    let Some(first) = trimmed.split_whitespace().next() else {
        return Command::Task(String::new());
    };
    if !first.starts_with('/') {
        return Command::Task(trimmed.to_string());
    }

    let bare = first.split('@').next().unwrap_or(first);
    match bare.to_ascii_lowercase().as_str() {
        "/status" => Command::Status,
        "/history" => Command::History,
        "/top" => Command::Top,
        "/code" => Command::Code,
        "/pause" => Command::Pause,
        "/resume" => Command::Resume,
        "/kill" => Command::Kill,
        "/directive" => {
            let text = trimmed.splitn(2, char::is_whitespace).nth(1).unwrap_or("").trim().to_string();
            Command::Directive(text)
        }
        _ => Command::Help,
    }
}

fn help_text() -> &'static str {
    "*Protea commands*\n\
     /status - current generation status\n\
     /history - last 10 fitness entries\n\
     /top - top 5 performers by score\n\
     /code - current worker source\n\
     /pause - pause evolution\n\
     /resume - resume evolution\n\
     /kill - restart the worker without advancing the generation\n\
     /directive <text> - queue a directive for the next evolution step\n\
     /help - this message"
}

fn format_entry(e: &FitnessEntry) -> String {
    format!(
        "gen {} score={:.2} survived={} runtime={:.0}s",
        e.generation_id, e.score, e.survived, e.runtime_sec
    )
}

fn format_entries(title: &str, entries: &[&FitnessEntry]) -> String {
    if entries.is_empty() {
        return format!("*{title}*\n(none yet)");
    }
    let lines: Vec<String> = entries.iter().map(|e| format!("- {}", format_entry(e))).collect();
    format!("*{title}*\n{}", lines.join("\n"))
}

fn truncate_chars(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        s.to_string()
    } else {
        let mut truncated: String = s.chars().take(limit).collect();
        truncated.push_str("\n... (truncated)");
        truncated
    }
}

pub struct ChatOperatorConfig {
    pub chat_id: String,
    pub worker_dir: PathBuf,
    pub entrypoint: String,
}

pub struct ChatOperator<T, G, C> {
    transport: Arc<T>,
    state: Arc<SharedState>,
    fitness: Arc<Mutex<FitnessLog>>,
    id_gen: G,
    clock: C,
    config: ChatOperatorConfig,
}

impl<T, G, C> ChatOperator<T, G, C>
where
    T: ChatTransport,
    G: IdGen,
    C: Clock,
{
    pub fn new(
        transport: Arc<T>,
        state: Arc<SharedState>,
        fitness: Arc<Mutex<FitnessLog>>,
        id_gen: G,
        clock: C,
        config: ChatOperatorConfig,
    ) -> Self {
        Self {
            transport,
            state,
            fitness,
            id_gen,
            clock,
            config,
        }
    }

    /// Long-poll loop. Returns once `shutdown` resolves so no new commands
    /// are accepted during the graceful shutdown sequence.
    pub async fn run(&self, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        let mut offset: i64 = 0;
        loop {
            if shutdown.try_recv().is_ok() {
                break;
            }

            let updates = self.transport.get_updates(offset).await;
            offset = next_offset(offset, &updates);

            for update in &updates {
                let Some(message) = &update.message else {
                    continue;
                };
                if message.chat.id != self.config.chat_id {
                    continue;
                }
                self.dispatch(&message.chat.id, &message.text).await;
            }
        }
    }

    async fn dispatch(&self, chat_id: &str, text: &str) {
        match parse_command(text) {
            Command::Status => {
                let snapshot = self.state.snapshot();
                let uptime = (self.clock.now() - snapshot.start_wall_time).max(0.0);
                self.transport.send_message(chat_id, &snapshot.to_markdown(uptime)).await;
            }
            Command::History => {
                let fitness = self.fitness.lock();
                let entries = fitness.history(10);
                self.transport.send_message(chat_id, &format_entries("Recent history", &entries)).await;
            }
            Command::Top => {
                let fitness = self.fitness.lock();
                let entries = fitness.top(5);
                self.transport.send_message(chat_id, &format_entries("Top performers", &entries)).await;
            }
            Command::Code => {
                let path = self.config.worker_dir.join(&self.config.entrypoint);
                let reply = match tokio::fs::read_to_string(&path).await {
                    Ok(source) => format!("```\n{}\n```", truncate_chars(&source, CODE_REPLY_LIMIT)),
                    Err(e) => format!("failed to read worker source: {e}"),
                };
                self.transport.send_message(chat_id, &reply).await;
            }
            Command::Pause => {
                self.state.set_pause(true);
                self.transport.send_message(chat_id, "Paused.").await;
            }
            Command::Resume => {
                self.state.set_pause(false);
                self.transport.send_message(chat_id, "Resumed.").await;
            }
            Command::Kill => {
                self.state.request_kill();
                self.transport.send_message(chat_id, "Kill requested; worker will restart.").await;
            }
            Command::Directive(text) => {
                let reply = if text.is_empty() {
                    "Usage: /directive <text>".to_string()
                } else {
                    self.state.set_directive(text.clone());
                    format!("Directive queued for the next evolution step: {text}")
                };
                self.transport.send_message(chat_id, &reply).await;
            }
            Command::Help => {
                self.transport.send_message(chat_id, help_text()).await;
            }
            Command::Task(text) => {
                let task = Task::new(self.id_gen.next(), text, chat_id.to_string(), self.clock.now());
                self.state.enqueue_task(task);
            }
        }
    }
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
