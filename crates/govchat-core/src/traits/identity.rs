// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity gateway trait wrapping the external identity provider.

use async_trait::async_trait;

use crate::error::GovchatError;
use crate::types::{Account, AuthOutcome, TokenSet};

/// Confidential-client operations against the identity provider.
///
/// `build_authorization_url` and `logout_url` are pure request construction;
/// the remaining operations perform network calls and may update an internal
/// token cache.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Builds the authorization-endpoint URL for an interactive sign-in.
    /// No local state is mutated.
    fn build_authorization_url(
        &self,
        scopes: &[String],
        redirect_uri: &str,
    ) -> Result<String, GovchatError>;

    /// Exchanges an authorization code for tokens and the account identity.
    ///
    /// Fails with [`GovchatError::AuthExchange`] on an invalid or expired
    /// code or a mismatched redirect URI. Codes are single-use: this call
    /// must not be retried.
    async fn exchange_code(
        &self,
        code: &str,
        scopes: &[String],
        redirect_uri: &str,
    ) -> Result<AuthOutcome, GovchatError>;

    /// Acquires a token for `scopes` without user interaction, via the
    /// internal cache or a refresh token.
    ///
    /// Fails with [`GovchatError::InteractionRequired`] when the provider
    /// demands fresh consent (callers fall back to the authorization URL),
    /// or [`GovchatError::AuthAcquisition`] for any other failure.
    async fn acquire_token_silently(
        &self,
        account: &Account,
        scopes: &[String],
        force_refresh: bool,
    ) -> Result<TokenSet, GovchatError>;

    /// Builds the provider logout URL. No network call is made; invalidating
    /// the local session is the caller's job.
    fn logout_url(&self, post_logout_redirect_uri: &str) -> String;
}
