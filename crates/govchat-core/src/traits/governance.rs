// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content-governance client trait.

use async_trait::async_trait;

use crate::error::GovchatError;
use crate::types::{Acknowledgment, ContentSubmission, GovernanceScope};

/// Calls against the external content-governance service.
///
/// Error taxonomy for both operations: 401/403 →
/// [`GovchatError::GovernanceAuth`] (the caller may reacquire the token
/// silently and retry at most once), other 4xx →
/// [`GovchatError::GovernanceBadRequest`], 5xx or network failure →
/// [`GovchatError::GovernanceUnavailable`]. The client itself never retries.
#[async_trait]
pub trait GovernanceClient: Send + Sync {
    /// Queries the protection scope for a user. The returned identifier is
    /// required on every subsequent content submission.
    async fn query_scope(
        &self,
        user_id: &str,
        governance_token: &str,
    ) -> Result<GovernanceScope, GovchatError>;

    /// Submits a unit of content for policy evaluation. Fire-and-confirm:
    /// callers must not proceed past a dependent pipeline stage until this
    /// returns successfully.
    async fn submit_content(
        &self,
        submission: &ContentSubmission,
        governance_token: &str,
    ) -> Result<Acknowledgment, GovchatError>;
}
