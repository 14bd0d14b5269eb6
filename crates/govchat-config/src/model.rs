// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Govchat application.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Govchat configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Identity and session sections carry required values
/// that validation enforces before the process serves any request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GovchatConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Identity provider (confidential client) settings.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Session cookie and store settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Completion API settings. When endpoint or key is absent the gateway
    /// serves canned replies instead.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Content-governance (Purview) API settings.
    #[serde(default)]
    pub purview: PurviewConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Identity provider configuration for the confidential client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Application (client) id. Required.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret. Required. Never logged.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Directory (tenant) id. Required.
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Base of the identity authority; tenant id is appended.
    #[serde(default = "default_cloud_instance")]
    pub cloud_instance: String,

    /// Redirect URI registered for the authorization-code flow. Required.
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Where the provider sends the browser after logout.
    #[serde(default = "default_post_logout_redirect_uri")]
    pub post_logout_redirect_uri: String,

    /// Scopes requested on initial sign-in.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Scopes for the separately acquired governance token.
    #[serde(default = "default_purview_scopes")]
    pub purview_scopes: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            tenant_id: None,
            cloud_instance: default_cloud_instance(),
            redirect_uri: None,
            post_logout_redirect_uri: default_post_logout_redirect_uri(),
            scopes: default_scopes(),
            purview_scopes: default_purview_scopes(),
        }
    }
}

fn default_cloud_instance() -> String {
    "https://login.microsoftonline.com/".to_string()
}

fn default_post_logout_redirect_uri() -> String {
    "/".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        "User.Read".to_string(),
        "openid".to_string(),
        "profile".to_string(),
        "offline_access".to_string(),
    ]
}

fn default_purview_scopes() -> Vec<String> {
    vec!["https://api.purview.microsoft.com/.default".to_string()]
}

/// Session cookie and store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Secret for session integrity. Required.
    #[serde(default)]
    pub secret: Option<String>,

    /// Mark the session cookie `Secure`. Must be true in production.
    #[serde(default)]
    pub cookie_secure: bool,

    /// Session lifetime in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: None,
            cookie_secure: false,
            ttl_hours: default_ttl_hours(),
        }
    }
}

fn default_ttl_hours() -> u64 {
    24
}

/// Completion API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionConfig {
    /// Full URL of the completion endpoint. `None` selects canned replies.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// API key presented in the `api-key` header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum tokens per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_max_tokens() -> u32 {
    100
}

fn default_temperature() -> f64 {
    0.7
}

/// Content-governance API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PurviewConfig {
    /// Base URL of the governance service.
    #[serde(default = "default_purview_base_url")]
    pub base_url: String,
}

impl Default for PurviewConfig {
    fn default() -> Self {
        Self {
            base_url: default_purview_base_url(),
        }
    }
}

fn default_purview_base_url() -> String {
    "https://api.purview.microsoft.com".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = GovchatConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.session.ttl_hours, 24);
        assert_eq!(config.completion.max_tokens, 100);
        assert_eq!(config.completion.temperature, 0.7);
        assert_eq!(
            config.purview.base_url,
            "https://api.purview.microsoft.com"
        );
        assert_eq!(
            config.identity.scopes,
            vec!["User.Read", "openid", "profile", "offline_access"]
        );
        assert_eq!(
            config.identity.purview_scopes,
            vec!["https://api.purview.microsoft.com/.default"]
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = r#"
[identity]
client_id = "app-1"
unknown_field = "bad"
"#;
        let result = toml::from_str::<GovchatConfig>(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn identity_section_deserializes() {
        let toml_str = r#"
[identity]
client_id = "app-1"
client_secret = "s3cret"
tenant_id = "tenant-1"
redirect_uri = "http://localhost:3000/auth/redirect"
"#;
        let config: GovchatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.identity.client_id.as_deref(), Some("app-1"));
        assert_eq!(config.identity.tenant_id.as_deref(), Some("tenant-1"));
        // Defaults fill the rest.
        assert_eq!(
            config.identity.cloud_instance,
            "https://login.microsoftonline.com/"
        );
    }
}
