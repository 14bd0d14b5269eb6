// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Enforces the required identity/session values at startup and semantic
//! constraints that cannot be expressed via serde attributes. Missing
//! required values fail the process, never a request.

use crate::diagnostic::ConfigError;
use crate::model::GovchatConfig;

/// Required keys whose absence aborts startup.
const REQUIRED: &[(&str, fn(&GovchatConfig) -> bool)] = &[
    ("identity.client_id", |c| is_set(&c.identity.client_id)),
    ("identity.client_secret", |c| {
        is_set(&c.identity.client_secret)
    }),
    ("identity.tenant_id", |c| is_set(&c.identity.tenant_id)),
    ("identity.redirect_uri", |c| is_set(&c.identity.redirect_uri)),
    ("session.secret", |c| is_set(&c.session.secret)),
];

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &GovchatConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    for (key, present) in REQUIRED {
        if !present(config) {
            errors.push(ConfigError::MissingKey {
                key: (*key).to_string(),
            });
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must be non-zero".to_string(),
        });
    }

    if config.session.ttl_hours == 0 {
        errors.push(ConfigError::Validation {
            message: "session.ttl_hours must be at least 1".to_string(),
        });
    }

    if !(0.0..=2.0).contains(&config.completion.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "completion.temperature must be within [0, 2], got {}",
                config.completion.temperature
            ),
        });
    }

    // Completion endpoint and key come as a pair.
    if config.completion.endpoint.is_some() != config.completion.api_key.is_some() {
        errors.push(ConfigError::Validation {
            message: "completion.endpoint and completion.api_key must be set together"
                .to_string(),
        });
    }

    if config.identity.scopes.is_empty() {
        errors.push(ConfigError::Validation {
            message: "identity.scopes must not be empty".to_string(),
        });
    }

    if config.identity.purview_scopes.is_empty() {
        errors.push(ConfigError::Validation {
            message: "identity.purview_scopes must not be empty".to_string(),
        });
    }

    if config.purview.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "purview.base_url must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
