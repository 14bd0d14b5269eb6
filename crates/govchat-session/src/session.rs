// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-browser-client session record and its conversation sequencer.
//!
//! Invariants: `conversation_id`, once minted, never changes for the session
//! lifetime; sequence numbers are strictly increasing and never reused. Both
//! operations happen under the store's per-session lock, so a duplicate
//! submit cannot observe the same sequence number twice.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use govchat_core::{Account, ConversationId, TokenSet};

/// Server-side session state, keyed by an opaque cookie id.
#[derive(Debug, Clone)]
pub struct Session {
    /// Authenticated identity; `None` until the redirect handler stores it.
    pub account: Option<Account>,
    /// Display name shown in the chat UI.
    pub user_name: Option<String>,
    /// Bearer credential for the identity provider's own APIs.
    pub primary_token: Option<TokenSet>,
    /// Separately-acquired credential for the governance API. May be absent
    /// when acquisition failed; the send path then fails with 401.
    pub purview_token: Option<TokenSet>,
    /// Stable conversation identifier, minted on the first message.
    pub conversation_id: Option<ConversationId>,
    /// Last issued sequence number; 0 means none issued yet.
    pub sequence_number: u64,
    /// Creation time, for TTL expiry.
    pub created_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an empty, unauthenticated session.
    pub fn new() -> Self {
        Self {
            account: None,
            user_name: None,
            primary_token: None,
            purview_token: None,
            conversation_id: None,
            sequence_number: 0,
            created_at: Utc::now(),
        }
    }

    /// True once the redirect handler has stored an identity.
    pub fn is_authenticated(&self) -> bool {
        self.account.is_some()
    }

    /// Returns the conversation id, minting it on first use.
    ///
    /// Idempotent after the first call: the id never changes for the
    /// lifetime of the session.
    pub fn ensure_conversation(&mut self) -> ConversationId {
        if let Some(ref id) = self.conversation_id {
            return id.clone();
        }
        let id = ConversationId(Uuid::new_v4().to_string());
        self.conversation_id = Some(id.clone());
        id
    }

    /// Issues the next sequence number: 1 on first call, then +1 each call.
    ///
    /// Called exactly once per governance submission (upload then download
    /// within a chat turn). Callers hold the store's per-session lock, which
    /// makes the read-modify-write atomic across concurrent requests.
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence_number += 1;
        self.sequence_number
    }
}
