// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Govchat application.
//!
//! This crate provides the error taxonomy, common types, and the adapter
//! traits implemented by the identity, governance, and completion crates.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::GovchatError;
pub use types::{
    Account, Acknowledgment, Activity, AuthOutcome, ChatMessage, ContentSubmission,
    ConversationId, GovernanceScope, TokenSet,
};

pub use traits::{GovernanceClient, IdentityGateway, ReplyGenerator};
