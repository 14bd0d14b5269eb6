// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `govchat serve` command implementation.
//!
//! Wires the identity gateway, governance client, reply source, and session
//! store into the gateway state, then serves HTTP until shutdown.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use govchat_completion::{CannedResponder, CompletionClient};
use govchat_config::GovchatConfig;
use govchat_core::{GovchatError, ReplyGenerator};
use govchat_gateway::{start_server, AppState, AuthSettings, Notifier};
use govchat_identity::MicrosoftIdentityGateway;
use govchat_purview::PurviewClient;
use govchat_session::SessionStore;

/// Initializes the tracing subscriber from the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Selects the reply source: the completion client when an endpoint is
/// configured, the canned table otherwise.
fn reply_generator(config: &GovchatConfig) -> Result<Arc<dyn ReplyGenerator>, GovchatError> {
    match (
        config.completion.endpoint.clone(),
        config.completion.api_key.clone(),
    ) {
        (Some(endpoint), Some(api_key)) => {
            info!(endpoint = %endpoint, "using completion API for replies");
            Ok(Arc::new(CompletionClient::new(
                endpoint,
                api_key,
                config.completion.max_tokens,
                config.completion.temperature,
            )?))
        }
        _ => {
            info!("no completion endpoint configured, using canned replies");
            Ok(Arc::new(CannedResponder::new()))
        }
    }
}

/// Runs the `govchat serve` command.
pub async fn run_serve(config: GovchatConfig) -> Result<(), GovchatError> {
    init_tracing(&config.server.log_level);

    info!("starting govchat serve");

    let identity = Arc::new(MicrosoftIdentityGateway::from_config(&config.identity)?);
    let governance = Arc::new(PurviewClient::new(config.purview.base_url.clone())?);
    let replies = reply_generator(&config)?;

    let sessions = SessionStore::new(Duration::from_secs(config.session.ttl_hours * 3600));

    let state = AppState {
        sessions,
        identity,
        governance,
        replies,
        notifier: Notifier::new(),
        auth: AuthSettings {
            scopes: config.identity.scopes.clone(),
            purview_scopes: config.identity.purview_scopes.clone(),
            redirect_uri: config
                .identity
                .redirect_uri
                .clone()
                .ok_or_else(|| GovchatError::Config("identity.redirect_uri is required".into()))?,
            post_logout_redirect_uri: config.identity.post_logout_redirect_uri.clone(),
            cookie_secure: config.session.cookie_secure,
        },
    };

    start_server(&config.server.host, config.server.port, state).await
}
