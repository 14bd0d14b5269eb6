// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock identity gateway for deterministic testing.
//!
//! Hands out scripted tokens without touching the network. Silent
//! acquisition can be scripted to fail or to require interaction, covering
//! the token-refresh and reacquire-retry paths.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use govchat_core::{
    Account, AuthOutcome, GovchatError, IdentityGateway, TokenSet,
};

/// An unsigned JWT whose payload carries the given claims. Tests use this
/// to fabricate tokens the claims decoder accepts.
pub fn fake_jwt(claims: &serde_json::Value) -> String {
    use base64::Engine;
    let engine = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let body = engine.encode(claims.to_string());
    format!("{header}.{body}.")
}

/// A token set expiring far in the future whose access token is an unsigned
/// JWT for `subject_id`.
pub fn fake_token(subject_id: &str) -> TokenSet {
    TokenSet {
        access_token: fake_jwt(&serde_json::json!({ "oid": subject_id })),
        expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// Tokens for upcoming silent acquisitions, FIFO.
    silent_tokens: Vec<TokenSet>,
    /// When set, the next silent acquisition fails with this error kind.
    fail_silent: Option<SilentFailure>,
    silent_calls: usize,
}

/// How a scripted silent acquisition should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilentFailure {
    InteractionRequired,
    Acquisition,
}

/// A scripted mock for the identity seam.
#[derive(Debug, Clone)]
pub struct MockIdentity {
    account: Account,
    inner: Arc<Mutex<Inner>>,
}

impl MockIdentity {
    /// Creates a mock whose exchange always yields `account`.
    pub fn new(account: Account) -> Self {
        Self {
            account,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Convenience: a mock for a user with the given subject id.
    pub fn for_subject(subject_id: &str) -> Self {
        Self::new(Account {
            subject_id: subject_id.to_string(),
            display_name: Some("Test User".to_string()),
            username: Some("test.user@contoso.example".to_string()),
        })
    }

    /// Queues a token for the next silent acquisition.
    pub async fn push_silent_token(&self, token: TokenSet) {
        self.inner.lock().await.silent_tokens.push(token);
    }

    /// Makes the next silent acquisition fail.
    pub async fn fail_next_silent(&self, failure: SilentFailure) {
        self.inner.lock().await.fail_silent = Some(failure);
    }

    /// Number of silent acquisitions attempted.
    pub async fn silent_calls(&self) -> usize {
        self.inner.lock().await.silent_calls
    }
}

#[async_trait]
impl IdentityGateway for MockIdentity {
    fn build_authorization_url(
        &self,
        scopes: &[String],
        redirect_uri: &str,
    ) -> Result<String, GovchatError> {
        Ok(format!(
            "https://login.example/authorize?scope={}&redirect_uri={redirect_uri}",
            scopes.join("+")
        ))
    }

    async fn exchange_code(
        &self,
        code: &str,
        _scopes: &[String],
        _redirect_uri: &str,
    ) -> Result<AuthOutcome, GovchatError> {
        if code == "bad-code" {
            return Err(GovchatError::AuthExchange {
                message: "mock rejected code".to_string(),
                status: Some(400),
                body: None,
            });
        }
        Ok(AuthOutcome {
            account: self.account.clone(),
            token: fake_token(&self.account.subject_id),
        })
    }

    async fn acquire_token_silently(
        &self,
        _account: &Account,
        _scopes: &[String],
        _force_refresh: bool,
    ) -> Result<TokenSet, GovchatError> {
        let mut inner = self.inner.lock().await;
        inner.silent_calls += 1;
        if let Some(failure) = inner.fail_silent.take() {
            return Err(match failure {
                SilentFailure::InteractionRequired => GovchatError::InteractionRequired {
                    message: "mock consent required".to_string(),
                },
                SilentFailure::Acquisition => GovchatError::AuthAcquisition {
                    message: "mock acquisition failure".to_string(),
                    status: None,
                    body: None,
                },
            });
        }
        if inner.silent_tokens.is_empty() {
            Ok(fake_token(&self.account.subject_id))
        } else {
            Ok(inner.silent_tokens.remove(0))
        }
    }

    fn logout_url(&self, post_logout_redirect_uri: &str) -> String {
        format!("https://login.example/logout?post_logout_redirect_uri={post_logout_redirect_uri}")
    }
}
