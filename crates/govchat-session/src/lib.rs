// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session state for Govchat: the token store and conversation sequencer.
//!
//! A [`Session`] holds the authenticated identity, the primary and
//! governance bearer tokens, the stable conversation id, and the
//! monotonically increasing sequence number that orders governance
//! submissions. The [`SessionStore`] keys sessions by an opaque cookie id
//! and wraps each in a per-session mutex so concurrent requests for the
//! same session serialize their sequence increments.

pub mod session;
pub mod store;

pub use session::Session;
pub use store::{SessionHandle, SessionStore, SESSION_COOKIE};
