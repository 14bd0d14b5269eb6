// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock governance client for deterministic testing.
//!
//! Records every call and can be scripted to fail the scope query or a
//! specific submission, enabling the short-circuit assertions in the
//! orchestrator and end-to-end tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use govchat_core::{
    Acknowledgment, ContentSubmission, GovchatError, GovernanceClient, GovernanceScope,
};

/// How a scripted governance call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GovernanceFailure {
    /// 401-style token rejection.
    Auth,
    /// 5xx-style outage.
    Unavailable,
}

impl GovernanceFailure {
    fn to_error(self) -> GovchatError {
        match self {
            GovernanceFailure::Auth => GovchatError::GovernanceAuth {
                status: Some(401),
                body: Some("mock token rejected".to_string()),
            },
            GovernanceFailure::Unavailable => GovchatError::GovernanceUnavailable {
                message: "mock governance outage".to_string(),
                status: Some(503),
                body: None,
            },
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// Scope identifiers to hand out, FIFO; empty falls back to "mock-scope".
    scopes: Vec<String>,
    /// Failures for upcoming query_scope calls, FIFO.
    scope_failures: Vec<GovernanceFailure>,
    /// Failures keyed by zero-based submit_content call index.
    submit_failures: std::collections::HashMap<usize, GovernanceFailure>,
    submit_call_count: usize,
    scope_calls: Vec<String>,
    submissions: Vec<ContentSubmission>,
}

/// A scripted, recording mock for the governance seam.
#[derive(Debug, Clone, Default)]
pub struct MockGovernance {
    inner: Arc<Mutex<Inner>>,
}

impl MockGovernance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a scope identifier for the next query.
    pub async fn push_scope(&self, scope: impl Into<String>) {
        self.inner.lock().await.scopes.push(scope.into());
    }

    /// Makes the next `query_scope` call fail.
    pub async fn fail_next_scope_query(&self, failure: GovernanceFailure) {
        self.inner.lock().await.scope_failures.push(failure);
    }

    /// Makes the next `submit_content` call fail.
    pub async fn fail_next_submission(&self, failure: GovernanceFailure) {
        let mut inner = self.inner.lock().await;
        let next = inner.submit_call_count;
        inner.submit_failures.insert(next, failure);
    }

    /// Makes the `n`-th `submit_content` call (zero-based, counted from the
    /// start of the test) fail. `n = 1` fails a turn's download submission
    /// while its upload succeeds.
    pub async fn fail_nth_submission(&self, n: usize, failure: GovernanceFailure) {
        self.inner.lock().await.submit_failures.insert(n, failure);
    }

    /// User ids passed to `query_scope`, in call order.
    pub async fn scope_calls(&self) -> Vec<String> {
        self.inner.lock().await.scope_calls.clone()
    }

    /// Submissions received, in call order.
    pub async fn submissions(&self) -> Vec<ContentSubmission> {
        self.inner.lock().await.submissions.clone()
    }

    pub async fn submission_count(&self) -> usize {
        self.inner.lock().await.submissions.len()
    }
}

#[async_trait]
impl GovernanceClient for MockGovernance {
    async fn query_scope(
        &self,
        user_id: &str,
        _governance_token: &str,
    ) -> Result<GovernanceScope, GovchatError> {
        let mut inner = self.inner.lock().await;
        inner.scope_calls.push(user_id.to_string());
        if !inner.scope_failures.is_empty() {
            let failure = inner.scope_failures.remove(0);
            return Err(failure.to_error());
        }
        let scope_identifier = if inner.scopes.is_empty() {
            "mock-scope".to_string()
        } else {
            inner.scopes.remove(0)
        };
        Ok(GovernanceScope { scope_identifier })
    }

    async fn submit_content(
        &self,
        submission: &ContentSubmission,
        _governance_token: &str,
    ) -> Result<Acknowledgment, GovchatError> {
        let mut inner = self.inner.lock().await;
        let call = inner.submit_call_count;
        inner.submit_call_count += 1;
        if let Some(failure) = inner.submit_failures.remove(&call) {
            return Err(failure.to_error());
        }
        inner.submissions.push(submission.clone());
        Ok(Acknowledgment {
            body: serde_json::json!({"protectionScopeState": "notModified"}),
        })
    }
}
