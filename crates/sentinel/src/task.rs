// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Task Executor (C10): drains C6's operator task queue one at a time,
//! answers with an LLM call seeded by the current generation context, and
//! always clears `p0_active` even when a step along the way fails.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use protea_adapters::{ChatTransport, ClaudeClient, LlmError};

use crate::state::{SharedState, TaskQueueReceiver};

const SOURCE_PREVIEW_LIMIT: usize = 2000;
const REPLY_LIMIT: usize = 4000;
const TASK_SYSTEM_PROMPT: &str = "You are the operator's assistant for a self-evolving supervised worker. \
Use the generation context below to answer the operator's request concisely.";

/// Narrow seam over the LLM call so the executor is testable without a
/// live `ClaudeClient`.
#[async_trait]
pub trait TaskLlm: Send + Sync + 'static {
    async fn ask(&self, system_prompt: &str, user_message: &str) -> Result<String, String>;
}

#[async_trait]
impl TaskLlm for ClaudeClient {
    async fn ask(&self, system_prompt: &str, user_message: &str) -> Result<String, String> {
        self.send_message(system_prompt, user_message)
            .await
            .map_err(|e: LlmError| e.to_string())
    }
}

pub struct TaskExecutorConfig {
    pub worker_dir: PathBuf,
    pub entrypoint: String,
}

pub struct TaskExecutor<L, T> {
    llm: Arc<L>,
    transport: Arc<T>,
    state: Arc<SharedState>,
    config: TaskExecutorConfig,
}

impl<L, T> TaskExecutor<L, T>
where
    L: TaskLlm,
    T: ChatTransport,
{
    pub fn new(llm: Arc<L>, transport: Arc<T>, state: Arc<SharedState>, config: TaskExecutorConfig) -> Self {
        Self { llm, transport, state, config }
    }

    /// Drain the task queue until `shutdown` resolves or the queue closes.
    pub async fn run(&self, mut queue: TaskQueueReceiver, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                task = queue.recv() => {
                    let Some(task) = task else { break };
                    self.execute(&task.chat_id, &task.text).await;
                }
            }
        }
    }

    async fn execute(&self, chat_id: &str, text: &str) {
        self.state.set_p0_active(true);
        let reply = self.build_reply(text).await;
        self.transport.send_message(chat_id, &truncate_reply(&reply)).await;
        self.state.set_p0_active(false);
    }

    async fn build_reply(&self, text: &str) -> String {
        let preamble = self.context_preamble().await;
        let user_message = format!("{preamble}\n\nOperator request:\n{text}");
        match self.llm.ask(TASK_SYSTEM_PROMPT, &user_message).await {
            Ok(reply) => reply,
            Err(e) => format!("Task failed: {e}"),
        }
    }

    async fn context_preamble(&self) -> String {
        let snapshot = self.state.snapshot();
        let source = tokio::fs::read_to_string(self.config.worker_dir.join(&self.config.entrypoint))
            .await
            .unwrap_or_default();
        let preview: String = source.chars().take(SOURCE_PREVIEW_LIMIT).collect();
        format!(
            "Generation: {}\nAlive: {}\nPaused: {}\nLast score: {:.2}\nLast survived: {}\n\nCurrent worker source (preview):\n{}",
            snapshot.generation_id, snapshot.alive, snapshot.paused, snapshot.last_score, snapshot.last_survived, preview
        )
    }
}

fn truncate_reply(reply: &str) -> String {
    if reply.chars().count() <= REPLY_LIMIT {
        reply.to_string()
    } else {
        let mut truncated: String = reply.chars().take(REPLY_LIMIT).collect();
        truncated.push_str("... (truncated)");
        truncated
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
