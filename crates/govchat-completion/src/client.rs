// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the hosted completion API.
//!
//! A single pass-through call: the user message goes out with a fixed system
//! prompt, and the first choice's content comes back verbatim as the reply.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use govchat_core::{GovchatError, ReplyGenerator};

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Request body for the completion endpoint.
#[derive(Debug, Serialize)]
struct CompletionRequest {
    messages: Vec<ChatTurnMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatTurnMessage {
    role: &'static str,
    content: String,
}

/// Response body from the completion endpoint.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Client for a hosted chat-completion endpoint authenticated with an
/// `api-key` header.
#[derive(Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_tokens: u32,
    temperature: f64,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[redacted]")
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl CompletionClient {
    /// Creates a client against the given completion endpoint.
    pub fn new(
        endpoint: String,
        api_key: String,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<Self, GovchatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| GovchatError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            max_tokens,
            temperature,
        })
    }
}

#[async_trait]
impl ReplyGenerator for CompletionClient {
    async fn generate(&self, user_message: &str) -> Result<String, GovchatError> {
        let request = CompletionRequest {
            messages: vec![
                ChatTurnMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatTurnMessage {
                    role: "user",
                    content: user_message.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GovchatError::ReplyGeneration {
                message: format!("completion request failed: {e}"),
                status: None,
                body: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GovchatError::ReplyGeneration {
                message: format!("completion endpoint returned {status}"),
                status: Some(status.as_u16()),
                body: Some(body),
            });
        }

        let parsed: CompletionResponse =
            response
                .json()
                .await
                .map_err(|e| GovchatError::ReplyGeneration {
                    message: format!("failed to parse completion response: {e}"),
                    status: None,
                    body: None,
                })?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| GovchatError::ReplyGeneration {
                message: "completion response carried no choices".to_string(),
                status: None,
                body: None,
            })?;

        debug!(reply_len = reply.len(), "completion reply received");
        Ok(reply)
    }
}
