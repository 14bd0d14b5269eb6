// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the content-governance API.
//!
//! Two calls: a protection-scope query and a multipart content submission.
//! Governance evaluation must see every piece of content that enters or
//! leaves the system, in order, so submissions are fire-and-confirm: callers
//! do not proceed past a dependent stage until the acknowledgment arrives.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use govchat_core::{
    Acknowledgment, ContentSubmission, GovchatError, GovernanceClient, GovernanceScope,
};

/// Fallback scope identifier when a successful scope query omits one.
const DEFAULT_SCOPE_IDENTIFIER: &str = "default-scope-id";

/// Application descriptors sent in the submission metadata block.
const APP_NAME: &str = "Govchat";
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wire shape of a protection-scope query response.
#[derive(Debug, Deserialize)]
struct ScopeResponse {
    #[serde(rename = "scopeIdentifier", default)]
    scope_identifier: Option<String>,
}

/// Client for the governance service's scope and submission endpoints.
#[derive(Debug, Clone)]
pub struct PurviewClient {
    client: reqwest::Client,
    base_url: String,
}

impl PurviewClient {
    /// Creates a client against the given governance base URL.
    pub fn new(base_url: String) -> Result<Self, GovchatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GovchatError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The user id travels in the path wrapped in literal braces; that is
    /// the wire format the service expects.
    fn scope_url(&self, user_id: &str) -> String {
        format!(
            "{}/v1/users/{{{}}}/ProtectionScopes/Query",
            self.base_url, user_id
        )
    }

    fn process_url(&self, user_id: &str) -> String {
        format!(
            "{}/v1/users/{{{}}}/Processors/ProcessContent",
            self.base_url, user_id
        )
    }

    /// Maps a non-success response to the governance error taxonomy.
    async fn failure(response: reqwest::Response) -> GovchatError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "governance call failed");
        match status.as_u16() {
            401 | 403 => GovchatError::GovernanceAuth {
                status: Some(status.as_u16()),
                body: Some(body),
            },
            code if (400..500).contains(&code) => GovchatError::GovernanceBadRequest {
                status: Some(code),
                body: Some(body),
            },
            code => GovchatError::GovernanceUnavailable {
                message: format!("governance service returned {status}"),
                status: Some(code),
                body: Some(body),
            },
        }
    }

    fn transport_failure(e: reqwest::Error) -> GovchatError {
        GovchatError::GovernanceUnavailable {
            message: format!("governance request failed: {e}"),
            status: None,
            body: None,
        }
    }

    /// Builds the metadata JSON block for a content submission.
    fn metadata(submission: &ContentSubmission) -> serde_json::Value {
        serde_json::json!({
            "contentMetadata": {
                "name": APP_NAME,
                "id": uuid::Uuid::new_v4().to_string(),
                "ownerId": submission.owner_id,
                "conversationId": submission.conversation_id.0,
                "sequenceNo": submission.sequence_no.to_string(),
            },
            "activityMetadata": {
                "activity": submission.activity.as_wire(),
                "applicationLocation": APP_NAME,
            },
            "deviceMetadata": {
                "managementType": "managed",
                "operatingSystem": std::env::consts::OS,
                "operatingSystemVersion": "unknown",
            },
            "protectedAppMetadata": {
                "name": APP_NAME,
                "version": APP_VERSION,
            },
            "integratedAppMetadata": {
                "name": APP_NAME,
                "version": APP_VERSION,
            },
            "scopeIdentifier": submission.scope_identifier,
        })
    }
}

#[async_trait]
impl GovernanceClient for PurviewClient {
    async fn query_scope(
        &self,
        user_id: &str,
        governance_token: &str,
    ) -> Result<GovernanceScope, GovchatError> {
        let response = self
            .client
            .post(self.scope_url(user_id))
            .bearer_auth(governance_token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(Self::transport_failure)?;

        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }

        let parsed: ScopeResponse = response.json().await.map_err(|e| {
            GovchatError::GovernanceUnavailable {
                message: format!("failed to parse scope response: {e}"),
                status: None,
                body: None,
            }
        })?;

        let scope_identifier = parsed
            .scope_identifier
            .unwrap_or_else(|| DEFAULT_SCOPE_IDENTIFIER.to_string());
        debug!(scope_identifier = %scope_identifier, "protection scope resolved");

        Ok(GovernanceScope { scope_identifier })
    }

    async fn submit_content(
        &self,
        submission: &ContentSubmission,
        governance_token: &str,
    ) -> Result<Acknowledgment, GovchatError> {
        let metadata = Self::metadata(submission);
        let form = reqwest::multipart::Form::new()
            .part(
                "metadata",
                reqwest::multipart::Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .map_err(|e| GovchatError::Internal(format!("metadata part: {e}")))?,
            )
            .part(
                "text",
                reqwest::multipart::Part::text(submission.payload.clone())
                    .mime_str("text/plain")
                    .map_err(|e| GovchatError::Internal(format!("text part: {e}")))?,
            );

        let response = self
            .client
            .post(self.process_url(&submission.owner_id))
            .bearer_auth(governance_token)
            .header("accept", "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(Self::transport_failure)?;

        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);

        debug!(
            activity = submission.activity.as_wire(),
            sequence_no = submission.sequence_no,
            "content submission acknowledged"
        );

        Ok(Acknowledgment { body })
    }
}
