// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content-governance (Purview) client for Govchat.
//!
//! Implements [`govchat_core::GovernanceClient`] over the governance
//! service's REST surface: the protection-scope query and the multipart
//! content-submission endpoint.

pub mod client;

pub use client::PurviewClient;
