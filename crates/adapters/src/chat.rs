// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat transport client (part of C9, the Chat Operator): long-polls the
//! Telegram Bot API's `getUpdates` method and sends replies via
//! `sendMessage`. Grounded in the original's `ring1/telegram_bot.py`
//! `_api_call`/`_get_updates` pair. Command parsing, authorization, and
//! dispatch are the Chat Operator's job in `protea-sentinel` — this
//! module only speaks the wire protocol.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const API_BASE: &str = "https://api.telegram.org";
const GET_UPDATES_TIMEOUT: Duration = Duration::from_secs(35);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Telegram long-poll window requested per `getUpdates` call.
const LONG_POLL_SECONDS: u64 = 30;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("chat API returned ok=false")]
    NotOk,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    #[serde(deserialize_with = "deserialize_chat_id")]
    pub id: String,
}

fn deserialize_chat_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        Str(String),
        Num(i64),
    }
    Ok(match IdValue::deserialize(deserializer)? {
        IdValue::Str(s) => s,
        IdValue::Num(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
}

/// Bidirectional chat transport: fetch new messages, send replies.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync + 'static {
    /// Long-poll for new updates starting at `offset`. Never errors up to
    /// the caller on transient network failures — returns an empty batch
    /// instead, matching the original's "errors never propagate" contract.
    async fn get_updates(&self, offset: i64) -> Vec<Update>;

    /// Fire-and-forget reply to `chat_id`.
    async fn send_message(&self, chat_id: &str, text: &str);
}

/// Telegram Bot API transport.
pub struct TelegramTransport {
    http: reqwest::Client,
    bot_token: String,
}

impl TelegramTransport {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token: bot_token.into(),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{method}", self.bot_token)
    }
}

#[async_trait::async_trait]
impl ChatTransport for TelegramTransport {
    async fn get_updates(&self, offset: i64) -> Vec<Update> {
        let body = serde_json::json!({ "offset": offset, "timeout": LONG_POLL_SECONDS });
        let response = self
            .http
            .post(self.url("getUpdates"))
            .timeout(GET_UPDATES_TIMEOUT)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "getUpdates failed");
                return Vec::new();
            }
        };

        match response.json::<ApiResponse<Vec<Update>>>().await {
            Ok(parsed) if parsed.ok => parsed.result.unwrap_or_default(),
            Ok(_) => Vec::new(),
            Err(e) => {
                tracing::debug!(error = %e, "getUpdates response parse failed");
                Vec::new()
            }
        }
    }

    async fn send_message(&self, chat_id: &str, text: &str) {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });
        let result = self
            .http
            .post(self.url("sendMessage"))
            .timeout(DEFAULT_TIMEOUT)
            .json(&body)
            .send()
            .await;
        if let Err(e) = result {
            tracing::debug!(error = %e, "sendMessage failed");
        }
    }
}

/// Next `offset` to request, given the last batch of updates — one past
/// the highest `update_id` seen, or unchanged if the batch was empty.
pub fn next_offset(current: i64, updates: &[Update]) -> i64 {
    updates
        .iter()
        .map(|u| u.update_id)
        .max()
        .map(|max| max + 1)
        .unwrap_or(current)
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
