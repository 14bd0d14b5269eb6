// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Govchat: scripted, recording mocks for the governance
//! and reply seams. Used by orchestrator unit tests and the end-to-end
//! suite; never compiled into release binaries.

pub mod mock_governance;
pub mod mock_identity;
pub mod mock_reply;

pub use mock_governance::{GovernanceFailure, MockGovernance};
pub use mock_identity::{fake_jwt, fake_token, MockIdentity, SilentFailure};
pub use mock_reply::MockReplyGenerator;
