// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Govchat application.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, environment variable
//! overrides, and diagnostic error rendering with typo suggestions. Required
//! values (client credentials, redirect URI, session secret) are enforced at
//! startup so that a misconfigured process never serves a request.
//!
//! # Usage
//!
//! ```no_run
//! use govchat_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("listening on {}:{}", config.server.host, config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::GovchatConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation (required keys)
/// 3. On Figment error: converts to miette diagnostics with typo suggestions
pub fn load_and_validate() -> Result<GovchatConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<GovchatConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = r#"
[identity]
client_id = "app-1"
client_secret = "s3cret"
tenant_id = "tenant-1"
redirect_uri = "http://localhost:3000/auth/redirect"

[session]
secret = "session-secret"
"#;

    #[test]
    fn complete_config_loads_and_validates() {
        let config = load_and_validate_str(COMPLETE).unwrap();
        assert_eq!(config.identity.client_id.as_deref(), Some("app-1"));
        assert_eq!(config.session.ttl_hours, 24);
    }

    #[test]
    fn missing_required_keys_are_reported() {
        let errors = load_and_validate_str("").unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::MissingKey { key } if key == "session.secret")));
    }

    #[test]
    fn unknown_key_becomes_diagnostic() {
        let errors = load_and_validate_str(
            r#"
[identity]
client_di = "app-1"
"#,
        )
        .unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "client_di" && suggestion.as_deref() == Some("client_id")
        )));
    }
}
