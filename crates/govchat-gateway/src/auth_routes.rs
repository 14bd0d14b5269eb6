// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sign-in, redirect, sign-out, and governance-token refresh routes.
//!
//! The redirect handler is the only place a session is created; the
//! purviewToken route is the only place interactive fallback happens
//! (a redirect to the consent URL on `InteractionRequired`).

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use govchat_core::GovchatError;

use crate::auth::{clear_session_cookie, session_cookie, session_from_jar};
use crate::handlers::ErrorResponse;
use crate::server::AppState;

/// Form body the identity provider posts back to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct RedirectForm {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Response body for GET /auth/purviewToken.
#[derive(Debug, Serialize)]
pub struct PurviewTokenResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "expiresOn")]
    pub expires_on: String,
}

/// GET /auth/signin
///
/// Redirects the browser to the provider's authorization endpoint.
pub async fn get_signin(State(state): State<AppState>) -> Response {
    match state
        .identity
        .build_authorization_url(&state.auth.scopes, &state.auth.redirect_uri)
    {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => {
            error!(error = %e, "failed to build authorization URL");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// POST /auth/redirect
///
/// Handles the provider's form post: exchanges the code, creates the
/// session, then best-effort acquires the governance token. A governance
/// acquisition failure is logged and the session continues without it; the
/// send path will answer 401 until the token-refresh route succeeds.
pub async fn post_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RedirectForm>,
) -> Response {
    if let Some(err) = form.error {
        let description = form.error_description.unwrap_or(err);
        error!(error = %description, "authentication error on redirect");
        return (StatusCode::INTERNAL_SERVER_ERROR, description).into_response();
    }

    let Some(code) = form.code else {
        return (
            StatusCode::BAD_REQUEST,
            "missing authorization code".to_string(),
        )
            .into_response();
    };

    let outcome = match state
        .identity
        .exchange_code(&code, &state.auth.scopes, &state.auth.redirect_uri)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "authorization code exchange failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    // The governance token is acquired separately; its absence is not fatal
    // to sign-in.
    let purview_token = match state
        .identity
        .acquire_token_silently(&outcome.account, &state.auth.purview_scopes, false)
        .await
    {
        Ok(token) => {
            info!("acquired governance token at sign-in");
            Some(token)
        }
        Err(e) => {
            warn!(error = %e, "governance token acquisition failed at sign-in");
            None
        }
    };

    let (session_id, handle) = state.sessions.create();
    {
        let mut session = handle.lock().await;
        session.user_name = Some(outcome.account.user_name().to_string());
        session.account = Some(outcome.account);
        session.primary_token = Some(outcome.token);
        session.purview_token = purview_token;
    }

    let jar = jar.add(session_cookie(&state, &session_id));
    (jar, Redirect::to("/chat")).into_response()
}

/// GET /auth/signout
///
/// Invalidates the local session and sends the browser to the provider
/// logout URL. No network call is made from here.
pub async fn get_signout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some((session_id, _)) = session_from_jar(&state, &jar) {
        state.sessions.remove(&session_id);
    }
    let logout = state
        .identity
        .logout_url(&state.auth.post_logout_redirect_uri);
    let jar = jar.add(clear_session_cookie());
    (jar, Redirect::to(&logout)).into_response()
}

/// GET /auth/purviewToken
///
/// Forced silent reacquisition of the governance token. This is the one
/// route with interactive fallback: `InteractionRequired` redirects to the
/// consent URL instead of failing.
pub async fn get_purview_token(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some((_, handle)) = session_from_jar(&state, &jar) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Not authenticated".to_string(),
            }),
        )
            .into_response();
    };

    let Some(account) = handle.lock().await.account.clone() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Not authenticated".to_string(),
            }),
        )
            .into_response();
    };

    match state
        .identity
        .acquire_token_silently(&account, &state.auth.purview_scopes, true)
        .await
    {
        Ok(token) => {
            let response = PurviewTokenResponse {
                access_token: token.access_token.clone(),
                expires_on: token.expires_at.to_rfc3339(),
            };
            handle.lock().await.purview_token = Some(token);
            Json(response).into_response()
        }
        Err(GovchatError::InteractionRequired { message }) => {
            warn!(reason = %message, "interactive consent required for governance token");
            match state
                .identity
                .build_authorization_url(&state.auth.purview_scopes, &state.auth.redirect_uri)
            {
                Ok(url) => Redirect::to(&url).into_response(),
                Err(e) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
                }
            }
        }
        Err(e) => {
            error!(error = %e, "governance token refresh failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to acquire Purview token: {e}"),
                }),
            )
                .into_response()
        }
    }
}
