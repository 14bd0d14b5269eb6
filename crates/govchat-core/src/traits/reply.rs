// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply generation trait.

use async_trait::async_trait;

use crate::error::GovchatError;

/// Produces the bot reply for a user message.
///
/// Implementations are either a canned lookup table or a single pass-through
/// call to a hosted completion API. Failure is
/// [`GovchatError::ReplyGeneration`].
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, user_message: &str) -> Result<String, GovchatError>;
}
