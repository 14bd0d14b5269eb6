// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat and governance HTTP handlers.
//!
//! Handles GET /chat, POST /chat/send, POST /purview/query, and
//! GET /purview/token. The send handler spawns the orchestrator pipeline as
//! a task so a client disconnect cannot cancel in-flight governance
//! submissions.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use govchat_core::GovchatError;
use govchat_identity::decode_claims_json;

use crate::auth::session_from_jar;
use crate::orchestrator::run_chat_turn;
use crate::server::AppState;

/// Request body for POST /chat/send.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    /// The user's message text.
    pub message: String,
}

/// Response body for POST /chat/send: `{success, botResponse}` on success,
/// `{success: false, error}` on failure.
#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub success: bool,
    #[serde(rename = "botResponse", skip_serializing_if = "Option::is_none")]
    pub bot_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response body for GET /chat. View rendering is an external collaborator;
/// the gateway serves the page data.
#[derive(Debug, Serialize)]
pub struct ChatPageResponse {
    pub title: String,
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
}

/// Response body for GET /purview/token.
#[derive(Debug, Serialize)]
pub struct TokenInfoResponse {
    #[serde(rename = "tokenAvailable")]
    pub token_available: bool,
    #[serde(rename = "decodedToken")]
    pub decoded_token: serde_json::Value,
}

/// Generic error body for the JSON routes.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Maps a turn error to the send-response envelope with its HTTP status.
fn send_error(err: &GovchatError) -> Response {
    let status = StatusCode::from_u16(err.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(SendResponse {
            success: false,
            bot_response: None,
            error: Some(err.to_string()),
        }),
    )
        .into_response()
}

/// GET /chat
///
/// Redirects unauthenticated browsers to sign-in; otherwise serves the chat
/// page payload.
pub async fn get_chat(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some((_, handle)) = session_from_jar(&state, &jar) else {
        return Redirect::to("/auth/signin").into_response();
    };

    let user_name = handle.lock().await.user_name.clone();
    Json(ChatPageResponse {
        title: "Chat".to_string(),
        user_name,
    })
    .into_response()
}

/// POST /chat/send
///
/// Runs one governed chat turn. The pipeline runs in a spawned task:
/// submission durability is decoupled from response delivery, so a client
/// disconnect cannot cut a governance submission short.
pub async fn post_chat_send(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SendRequest>,
) -> Response {
    let Some((_, session)) = session_from_jar(&state, &jar) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(SendResponse {
                success: false,
                bot_response: None,
                error: Some("Not authenticated".to_string()),
            }),
        )
            .into_response();
    };

    let ctx = state.turn_context();
    let turn = tokio::spawn(run_chat_turn(ctx, session, body.message));

    match turn.await {
        Ok(Ok(outcome)) => {
            info!(
                conversation_id = %outcome.conversation_id,
                upload_sequence = outcome.upload_sequence,
                download_sequence = outcome.download_sequence,
                "chat turn succeeded"
            );
            Json(SendResponse {
                success: true,
                bot_response: Some(outcome.bot_response),
                error: None,
            })
            .into_response()
        }
        Ok(Err(err)) => {
            error!(error = %err, "chat turn failed");
            send_error(&err)
        }
        Err(join_err) => {
            error!(error = %join_err, "chat turn task panicked");
            send_error(&GovchatError::Internal("chat turn task failed".to_string()))
        }
    }
}

/// POST /purview/query
///
/// Runs a protection-scope query for the signed-in user and returns the
/// resolved scope identifier.
pub async fn post_purview_query(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some((_, handle)) = session_from_jar(&state, &jar) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "User not authenticated".to_string(),
            }),
        )
            .into_response();
    };

    let Some(token) = handle.lock().await.purview_token.clone() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Purview token not available".to_string(),
            }),
        )
            .into_response();
    };

    let user_id = match decode_claims_json(&token.access_token)
        .ok()
        .and_then(|claims| {
            claims
                .get("oid")
                .or_else(|| claims.get("sub"))
                .and_then(|v| v.as_str())
                .map(String::from)
        }) {
        Some(id) => id,
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "User ID not found in token".to_string(),
                }),
            )
                .into_response();
        }
    };

    match state
        .governance
        .query_scope(&user_id, &token.access_token)
        .await
    {
        Ok(scope) => Json(serde_json::json!({
            "scopeIdentifier": scope.scope_identifier,
        }))
        .into_response(),
        Err(err) => {
            error!(error = %err, "protection scope query failed");
            let status = StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /purview/token
///
/// Reports whether the session holds a governance token and echoes its
/// decoded claims for inspection.
pub async fn get_purview_token_info(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some((_, handle)) = session_from_jar(&state, &jar) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "User not authenticated".to_string(),
            }),
        )
            .into_response();
    };

    let Some(token) = handle.lock().await.purview_token.clone() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "No Purview token available".to_string(),
            }),
        )
            .into_response();
    };

    let decoded = decode_claims_json(&token.access_token).unwrap_or(serde_json::Value::Null);
    Json(TokenInfoResponse {
        token_available: true,
        decoded_token: decoded,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_deserializes() {
        let req: SendRequest = serde_json::from_str(r#"{"message": "hello"}"#).unwrap();
        assert_eq!(req.message, "hello");
    }

    #[test]
    fn send_request_requires_message() {
        assert!(serde_json::from_str::<SendRequest>("{}").is_err());
    }

    #[test]
    fn success_response_omits_error_field() {
        let response = SendResponse {
            success: true,
            bot_response: Some("hi".into()),
            error: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"botResponse\":\"hi\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn failure_response_omits_bot_response_field() {
        let response = SendResponse {
            success: false,
            bot_response: None,
            error: Some("Purview token not available".into()),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"error\":\"Purview token not available\""));
        assert!(!json.contains("botResponse"));
    }

    #[test]
    fn chat_page_response_serializes_user_name() {
        let response = ChatPageResponse {
            title: "Chat".into(),
            user_name: Some("Ada".into()),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"userName\":\"Ada\""));
    }

    #[test]
    fn token_info_response_serializes() {
        let response = TokenInfoResponse {
            token_available: true,
            decoded_token: serde_json::json!({"oid": "user-1"}),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"tokenAvailable\":true"));
        assert!(json.contains("\"decodedToken\""));
    }
}
