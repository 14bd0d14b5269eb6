// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confidential-client gateway against the Microsoft identity platform.
//!
//! Drives the v2.0 authorize/token/logout endpoints directly: authorization
//! URL construction, authorization-code exchange, and refresh-token-based
//! silent acquisition with an internal per-account token cache.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;
use tracing::{debug, warn};

use govchat_core::{Account, AuthOutcome, GovchatError, IdentityGateway, TokenSet};

use crate::claims;

/// Cached tokens are considered stale this long before their real expiry,
/// so a token returned from the cache is never about to lapse mid-request.
const CACHE_EXPIRY_BUFFER: chrono::Duration = chrono::Duration::seconds(300);

/// OAuth error codes that require fresh interactive consent.
const INTERACTION_ERRORS: &[&str] =
    &["interaction_required", "consent_required", "login_required"];

/// Wire shape of a v2.0 token endpoint success response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Wire shape of a v2.0 token endpoint error response.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
    #[serde(default)]
    suberror: Option<String>,
}

/// Confidential-client identity gateway.
///
/// Holds the internal token cache that silent acquisition reads and
/// updates: refresh tokens per account, and access tokens per account+scope
/// with an expiry buffer.
pub struct MicrosoftIdentityGateway {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    /// Authority base, e.g. `https://login.microsoftonline.com/<tenant>`.
    authority: String,
    /// subject_id -> refresh token.
    refresh_tokens: DashMap<String, String>,
    /// "subject_id|scope scope ..." -> cached access token.
    access_tokens: DashMap<String, TokenSet>,
}

impl std::fmt::Debug for MicrosoftIdentityGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicrosoftIdentityGateway")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("authority", &self.authority)
            .finish()
    }
}

impl MicrosoftIdentityGateway {
    /// Creates a gateway for the given confidential client.
    ///
    /// `authority` is the full authority URL without a trailing slash,
    /// typically `cloud_instance + tenant_id`.
    pub fn new(
        client_id: String,
        client_secret: String,
        authority: String,
    ) -> Result<Self, GovchatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GovchatError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            client_id,
            client_secret,
            authority: authority.trim_end_matches('/').to_string(),
            refresh_tokens: DashMap::new(),
            access_tokens: DashMap::new(),
        })
    }

    /// Builds a gateway from the identity config section. Validation has
    /// already guaranteed the required values are present.
    pub fn from_config(config: &govchat_config::model::IdentityConfig) -> Result<Self, GovchatError> {
        let client_id = config
            .client_id
            .clone()
            .ok_or_else(|| GovchatError::Config("identity.client_id is required".into()))?;
        let client_secret = config
            .client_secret
            .clone()
            .ok_or_else(|| GovchatError::Config("identity.client_secret is required".into()))?;
        let tenant_id = config
            .tenant_id
            .clone()
            .ok_or_else(|| GovchatError::Config("identity.tenant_id is required".into()))?;
        Self::new(
            client_id,
            client_secret,
            format!("{}{}", config.cloud_instance, tenant_id),
        )
    }

    fn token_endpoint(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.authority)
    }

    fn cache_key(subject_id: &str, scopes: &[String]) -> String {
        format!("{subject_id}|{}", scopes.join(" "))
    }

    /// Resolves the account identity from the id token, falling back to the
    /// access token's claims when the provider returned none.
    fn account_from_response(response: &TokenResponse) -> Result<Account, GovchatError> {
        let token = response
            .id_token
            .as_deref()
            .unwrap_or(&response.access_token);
        let decoded = claims::decode_claims(token)?;
        let subject_id = decoded
            .user_id()
            .ok_or_else(|| {
                GovchatError::IdentityResolution("token carries neither oid nor sub".to_string())
            })?
            .to_string();
        Ok(Account {
            subject_id,
            display_name: decoded.name,
            username: decoded.preferred_username,
        })
    }

    fn token_set(response: &TokenResponse) -> TokenSet {
        TokenSet {
            access_token: response.access_token.clone(),
            expires_at: Utc::now() + chrono::Duration::seconds(response.expires_in as i64),
        }
    }

    /// Stores the refresh token (rotated or first-seen) and the access token
    /// for this account+scope pair.
    fn update_cache(&self, subject_id: &str, scopes: &[String], response: &TokenResponse) {
        if let Some(ref refresh) = response.refresh_token {
            self.refresh_tokens
                .insert(subject_id.to_string(), refresh.clone());
        }
        self.access_tokens
            .insert(Self::cache_key(subject_id, scopes), Self::token_set(response));
    }

    /// Classifies a token endpoint failure body.
    fn classify_failure(status: u16, body: String) -> GovchatError {
        if let Ok(parsed) = serde_json::from_str::<TokenErrorResponse>(&body) {
            let consent_suberror = parsed
                .suberror
                .as_deref()
                .is_some_and(|s| s.contains("consent"));
            if INTERACTION_ERRORS.contains(&parsed.error.as_str())
                || (parsed.error == "invalid_grant" && consent_suberror)
            {
                return GovchatError::InteractionRequired {
                    message: parsed.error_description,
                };
            }
        }
        GovchatError::AuthAcquisition {
            message: format!("token endpoint returned {status}"),
            status: Some(status),
            body: Some(body),
        }
    }
}

#[async_trait]
impl IdentityGateway for MicrosoftIdentityGateway {
    fn build_authorization_url(
        &self,
        scopes: &[String],
        redirect_uri: &str,
    ) -> Result<String, GovchatError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/oauth2/v2.0/authorize", self.authority),
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", redirect_uri),
                ("response_mode", "form_post"),
                ("scope", &scopes.join(" ")),
            ],
        )
        .map_err(|e| GovchatError::Internal(format!("invalid authority URL: {e}")))?;
        Ok(url.to_string())
    }

    async fn exchange_code(
        &self,
        code: &str,
        scopes: &[String],
        redirect_uri: &str,
    ) -> Result<AuthOutcome, GovchatError> {
        let scope = scopes.join(" ");
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
        ];

        // Codes are single-use: a failed exchange is never retried.
        let response = self
            .client
            .post(self.token_endpoint())
            .form(&params)
            .send()
            .await
            .map_err(|e| GovchatError::AuthExchange {
                message: format!("token request failed: {e}"),
                status: None,
                body: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "authorization code exchange rejected");
            return Err(GovchatError::AuthExchange {
                message: format!("token endpoint returned {status}"),
                status: Some(status.as_u16()),
                body: Some(body),
            });
        }

        let parsed: TokenResponse =
            response.json().await.map_err(|e| GovchatError::AuthExchange {
                message: format!("failed to parse token response: {e}"),
                status: None,
                body: None,
            })?;

        let account = Self::account_from_response(&parsed)?;
        self.update_cache(&account.subject_id, scopes, &parsed);
        debug!(subject_id = %account.subject_id, "authorization code exchanged");

        Ok(AuthOutcome {
            token: Self::token_set(&parsed),
            account,
        })
    }

    async fn acquire_token_silently(
        &self,
        account: &Account,
        scopes: &[String],
        force_refresh: bool,
    ) -> Result<TokenSet, GovchatError> {
        let key = Self::cache_key(&account.subject_id, scopes);

        if !force_refresh
            && let Some(cached) = self.access_tokens.get(&key)
            && cached.expires_at > Utc::now() + CACHE_EXPIRY_BUFFER
        {
            debug!(subject_id = %account.subject_id, "token served from cache");
            return Ok(cached.clone());
        }

        let refresh_token = self
            .refresh_tokens
            .get(&account.subject_id)
            .map(|r| r.clone())
            .ok_or_else(|| GovchatError::AuthAcquisition {
                message: "no cached refresh token for account".to_string(),
                status: None,
                body: None,
            })?;

        let scope = scopes.join(" ");
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .client
            .post(self.token_endpoint())
            .form(&params)
            .send()
            .await
            .map_err(|e| GovchatError::AuthAcquisition {
                message: format!("token request failed: {e}"),
                status: None,
                body: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_failure(status.as_u16(), body));
        }

        let parsed: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| GovchatError::AuthAcquisition {
                    message: format!("failed to parse token response: {e}"),
                    status: None,
                    body: None,
                })?;

        self.update_cache(&account.subject_id, scopes, &parsed);
        debug!(subject_id = %account.subject_id, "token acquired silently");

        Ok(Self::token_set(&parsed))
    }

    fn logout_url(&self, post_logout_redirect_uri: &str) -> String {
        match reqwest::Url::parse_with_params(
            &format!("{}/oauth2/v2.0/logout", self.authority),
            &[("post_logout_redirect_uri", post_logout_redirect_uri)],
        ) {
            Ok(url) => url.to_string(),
            // Authority was already validated at construction; keep a sane
            // fallback rather than panicking in a logout path.
            Err(_) => format!("{}/oauth2/v2.0/logout", self.authority),
        }
    }
}
