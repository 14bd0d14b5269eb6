// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Each trait is the seam between the orchestration pipeline and an external
//! collaborator: the identity provider, the content-governance service, and
//! the reply source.

pub mod governance;
pub mod identity;
pub mod reply;

pub use governance::GovernanceClient;
pub use identity::IdentityGateway;
pub use reply::ReplyGenerator;
