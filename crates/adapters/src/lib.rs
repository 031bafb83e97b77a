// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapters: the I/O boundary. Every module here wraps an external
//! resource — a worker process, a git repository, an HTTP API — behind a
//! small trait so `protea-sentinel`'s kernel logic can be exercised
//! against fakes.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod chat;
mod heartbeat;
mod llm;
mod resources;
mod revision;
mod worker;

pub use chat::{next_offset, Chat, ChatError, ChatMessage, ChatTransport, TelegramTransport, Update};
pub use heartbeat::{spawn_liveness_watch, HeartbeatMonitor};
pub use llm::{ClaudeClient, LlmError};
pub use resources::ResourceSample;
pub use revision::{GitRevisionStore, RevisionError, RevisionStore};
pub use worker::{ProcessWorkerLifecycle, WorkerError, WorkerHandle, WorkerLifecycle};
