// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for Govchat.
//!
//! The axum surface (auth, chat, and purview routes plus the realtime
//! notifier) and the chat orchestrator: the per-turn pipeline that stamps
//! each message with a conversation id and sequence number, submits it for
//! governance evaluation, obtains the bot reply, and submits that too
//! before responding.

pub mod auth;
pub mod auth_routes;
pub mod handlers;
pub mod orchestrator;
pub mod server;
pub mod ws;

pub use orchestrator::{run_chat_turn, TurnContext, TurnOutcome};
pub use server::{router, start_server, AppState, AuthSettings};
pub use ws::Notifier;
