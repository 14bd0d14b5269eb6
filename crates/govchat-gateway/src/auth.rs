// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-cookie plumbing for the gateway.
//!
//! Sessions live server-side in the [`govchat_session::SessionStore`]; the
//! cookie only carries the opaque session id. HttpOnly always; `Secure` per
//! configuration (production deployments set it).

use axum_extra::extract::cookie::{Cookie, CookieJar};

use govchat_session::{SessionHandle, SESSION_COOKIE};

use crate::server::AppState;

/// Resolves the live session referenced by the request's cookie, if any.
pub fn session_from_jar(state: &AppState, jar: &CookieJar) -> Option<(String, SessionHandle)> {
    let id = jar.get(SESSION_COOKIE)?.value().to_string();
    let handle = state.sessions.get(&id)?;
    Some((id, handle))
}

/// Builds the session cookie for a freshly created session.
pub fn session_cookie(state: &AppState, session_id: &str) -> Cookie<'static> {
    let max_age_secs = state.sessions.ttl().as_secs();
    let secure = if state.auth.cookie_secure {
        "; Secure"
    } else {
        ""
    };
    Cookie::parse(format!(
        "{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}{secure}"
    ))
    .expect("statically shaped cookie string")
}

/// Builds an expired cookie that clears the session id in the browser.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::parse(format!(
        "{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
    ))
    .expect("statically shaped cookie string")
}
