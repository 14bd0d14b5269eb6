// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock reply generator for deterministic testing.
//!
//! Replies are popped from a FIFO queue; an empty queue falls back to a
//! default reply. Failure injection covers the reply-generation
//! short-circuit path.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use govchat_core::{GovchatError, ReplyGenerator};

#[derive(Debug, Default)]
struct Inner {
    replies: VecDeque<String>,
    fail_next: bool,
    calls: Vec<String>,
}

/// A queue-backed mock for the reply seam.
#[derive(Debug, Clone, Default)]
pub struct MockReplyGenerator {
    inner: Arc<Mutex<Inner>>,
}

impl MockReplyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                replies: VecDeque::from(replies),
                ..Inner::default()
            })),
        }
    }

    /// Makes the next `generate` call fail.
    pub async fn fail_next(&self) {
        self.inner.lock().await.fail_next = true;
    }

    /// User messages passed to `generate`, in call order.
    pub async fn calls(&self) -> Vec<String> {
        self.inner.lock().await.calls.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.inner.lock().await.calls.len()
    }
}

#[async_trait]
impl ReplyGenerator for MockReplyGenerator {
    async fn generate(&self, user_message: &str) -> Result<String, GovchatError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(user_message.to_string());
        if inner.fail_next {
            inner.fail_next = false;
            return Err(GovchatError::ReplyGeneration {
                message: "mock reply failure".to_string(),
                status: None,
                body: None,
            });
        }
        Ok(inner
            .replies
            .pop_front()
            .unwrap_or_else(|| "mock reply".to_string()))
    }
}
