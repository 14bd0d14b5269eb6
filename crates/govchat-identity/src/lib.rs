// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity gateway for Govchat.
//!
//! Wraps the Microsoft identity platform's v2.0 endpoints behind the
//! [`govchat_core::IdentityGateway`] trait: authorization-URL construction,
//! confidential-client authorization-code exchange, silent (refresh-token)
//! acquisition with an internal token cache, and logout-URL construction.
//! Also provides unverified JWT claims decoding for subject-id resolution.

pub mod claims;
pub mod gateway;

pub use claims::{decode_claims, decode_claims_json, Claims};
pub use gateway::MicrosoftIdentityGateway;
