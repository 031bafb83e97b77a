// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator-submitted free-form tasks, processed FIFO by the Task Executor.

use serde::{Deserialize, Serialize};

use crate::id::TaskId;

/// A free-form request submitted by the operator through the chat channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub chat_id: String,
    pub enqueued_at: f64,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, text: impl Into<String>, chat_id: impl Into<String>, enqueued_at: f64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            chat_id: chat_id.into(),
            enqueued_at,
        }
    }
}
