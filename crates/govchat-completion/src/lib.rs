// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply generation for Govchat.
//!
//! Two [`govchat_core::ReplyGenerator`] implementations: a pass-through
//! client for a hosted completion API, and a canned keyword-bucket table
//! used when no endpoint is configured.

pub mod canned;
pub mod client;

pub use canned::CannedResponder;
pub use client::CompletionClient;
