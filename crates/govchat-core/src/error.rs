// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Govchat application.

use thiserror::Error;

/// The primary error type used across the Govchat crates.
///
/// Variants that originate from an upstream HTTP call carry the upstream
/// status code and response body so request boundaries can report them
/// without re-inspecting loosely typed fields.
#[derive(Debug, Error)]
pub enum GovchatError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The authorization-code exchange was rejected (invalid/expired code,
    /// mismatched redirect URI). Codes are single-use; never retried.
    #[error("authorization code exchange failed: {message}")]
    AuthExchange {
        message: String,
        status: Option<u16>,
        body: Option<String>,
    },

    /// The identity provider demands a fresh interactive consent.
    /// Callers fall back to the authorization URL.
    #[error("interactive sign-in required: {message}")]
    InteractionRequired { message: String },

    /// Silent token acquisition failed for a non-interactive reason
    /// (network, revoked consent, missing refresh token).
    #[error("token acquisition failed: {message}")]
    AuthAcquisition {
        message: String,
        status: Option<u16>,
        body: Option<String>,
    },

    /// The session has no governance token; the message-send path does not
    /// perform interactive fallback.
    #[error("Purview token not available")]
    GovernanceTokenUnavailable,

    /// The stable subject id could not be resolved from token claims.
    #[error("identity resolution failed: {0}")]
    IdentityResolution(String),

    /// The governance service rejected the bearer token (401/403).
    #[error("governance auth error ({status:?})")]
    GovernanceAuth {
        status: Option<u16>,
        body: Option<String>,
    },

    /// The governance service rejected the request (4xx other than auth).
    #[error("governance rejected request ({status:?})")]
    GovernanceBadRequest {
        status: Option<u16>,
        body: Option<String>,
    },

    /// The governance service is unreachable or failing (5xx or network).
    #[error("governance service unavailable: {message}")]
    GovernanceUnavailable {
        message: String,
        status: Option<u16>,
        body: Option<String>,
    },

    /// Reply generation failed (completion endpoint error or malformed response).
    #[error("reply generation failed: {message}")]
    ReplyGeneration {
        message: String,
        status: Option<u16>,
        body: Option<String>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GovchatError {
    /// HTTP status for the request boundary: 401 for auth-class errors,
    /// 500 for everything else.
    pub fn http_status(&self) -> u16 {
        match self {
            GovchatError::AuthExchange { .. }
            | GovchatError::InteractionRequired { .. }
            | GovchatError::AuthAcquisition { .. }
            | GovchatError::GovernanceTokenUnavailable
            | GovchatError::GovernanceAuth { .. } => 401,
            _ => 500,
        }
    }

    /// True for errors the identity gateway may resolve with a silent
    /// token reacquisition (expired/invalid governance bearer).
    pub fn is_governance_auth(&self) -> bool {
        matches!(self, GovchatError::GovernanceAuth { .. })
    }
}
