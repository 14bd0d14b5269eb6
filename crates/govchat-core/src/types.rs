// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Govchat crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier for a conversation, minted on the first message of a
/// session and reused for every subsequent governance submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issuer-assigned identity of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable subject id (`oid` claim, falling back to `sub`).
    pub subject_id: String,
    /// Display name, if the id token carried one.
    pub display_name: Option<String>,
    /// Sign-in name (`preferred_username`).
    pub username: Option<String>,
}

impl Account {
    /// Name shown in the chat UI: display name, else username, else subject id.
    pub fn user_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(&self.subject_id)
    }
}

/// A bearer credential with its expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// The raw bearer token presented in Authorization headers.
    pub access_token: String,
    /// Absolute expiry of the token.
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// True once the token has expired (no freshness buffer applied here).
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Result of a successful authorization-code exchange.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub account: Account,
    /// Primary access token for the identity provider's own APIs.
    pub token: TokenSet,
}

/// The result of a protection-scope query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceScope {
    /// Opaque token the governance service requires on every content
    /// submission for this user.
    pub scope_identifier: String,
}

/// Direction of a governed content submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// Outbound user content entering the system.
    Upload,
    /// Inbound bot content leaving the system.
    Download,
}

impl Activity {
    /// Wire value expected by the governance service.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Activity::Upload => "uploadText",
            Activity::Download => "downloadText",
        }
    }
}

/// A unit of content sent to the governance service.
#[derive(Debug, Clone)]
pub struct ContentSubmission {
    pub activity: Activity,
    /// The authenticated user's stable subject id.
    pub owner_id: String,
    pub conversation_id: ConversationId,
    /// Per-conversation monotonic submission order.
    pub sequence_no: u64,
    /// Scope identifier from the preceding scope query.
    pub scope_identifier: String,
    /// The raw text being evaluated.
    pub payload: String,
}

/// Success receipt from a content submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Acknowledgment {
    /// Raw response body from the governance service, if any.
    pub body: serde_json::Value,
}

/// Persisted chat message record shape. Nothing on the live path reads these
/// back; the type exists as an optional persistence sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub author_name: String,
    pub author_id: String,
    pub timestamp: DateTime<Utc>,
}
