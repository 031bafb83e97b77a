// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LLM client (part of C8, the Evolution Orchestrator's dependency): a
//! thin `reqwest` wrapper around the Anthropic Messages API, grounded in
//! the original's `ring1/llm_client.py` retry/backoff policy and in the
//! teacher's `reqwest`-over-`thiserror` adapter idiom (see
//! `tmdb_api_provider.rs` in the donor example).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const RETRYABLE_STATUS: [u16; 5] = [429, 500, 502, 503, 529];
const MAX_RETRIES: u32 = 3;
const BASE_DELAY: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("CLAUDE_API_KEY is not set")]
    MissingApiKey,
    #[error("Claude API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Claude API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Claude API response had no text content block")]
    NoTextContent,
    #[error("Claude API failed after {0} retries")]
    RetriesExhausted(u32),
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Anthropic Messages API client.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key,
            model: model.into(),
            max_tokens,
        })
    }

    /// Send a single-turn message and return Claude's text reply, retrying
    /// on transient errors with exponential backoff.
    pub async fn send_message(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: system_prompt,
            messages: vec![Message {
                role: "user",
                content: user_message,
            }],
        };

        for attempt in 0..MAX_RETRIES {
            let response = self
                .http
                .post(API_URL)
                .header("content-type", "application/json")
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                let parsed: MessagesResponse = response.json().await?;
                return extract_text(parsed);
            }

            let code = status.as_u16();
            let retryable = RETRYABLE_STATUS.contains(&code);
            if retryable && attempt + 1 < MAX_RETRIES {
                let delay = BASE_DELAY * 2u32.pow(attempt);
                tracing::warn!(status = code, attempt = attempt + 1, ?delay, "Claude API retry");
                tokio::time::sleep(delay).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Http { status: code, body });
        }

        Err(LlmError::RetriesExhausted(MAX_RETRIES))
    }
}

fn extract_text(response: MessagesResponse) -> Result<String, LlmError> {
    response
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .map(|block| block.text)
        .ok_or(LlmError::NoTextContent)
}

#[cfg(test)]
#[path = "llm_tests.rs"]
mod tests;
