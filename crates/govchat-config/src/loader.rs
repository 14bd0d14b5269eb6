// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./govchat.toml` > `~/.config/govchat/govchat.toml`
//! > `/etc/govchat/govchat.toml` with environment variable overrides via the
//! `GOVCHAT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::GovchatConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/govchat/govchat.toml` (system-wide)
/// 3. `~/.config/govchat/govchat.toml` (user XDG config)
/// 4. `./govchat.toml` (local directory)
/// 5. `GOVCHAT_*` environment variables
pub fn load_config() -> Result<GovchatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GovchatConfig::default()))
        .merge(Toml::file("/etc/govchat/govchat.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("govchat/govchat.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("govchat.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<GovchatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GovchatConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GovchatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GovchatConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Known top-level config sections, for env-key-to-dotted-path mapping.
const SECTIONS: &[&str] = &["server", "identity", "session", "completion", "purview"];

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `GOVCHAT_IDENTITY_CLIENT_ID`
/// must map to `identity.client_id`, not `identity.client.id`. Only the
/// leading section name becomes a dot: `GOVCHAT_IDENTITY_PURVIEW_SCOPES`
/// maps to `identity.purview_scopes`, untouched by the `purview` section.
fn env_provider() -> Env {
    Env::prefixed("GOVCHAT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: GOVCHAT_IDENTITY_CLIENT_ID -> "identity_client_id"
        let key_str = key.as_str();
        for section in SECTIONS {
            if let Some(rest) = key_str.strip_prefix(&format!("{section}_")) {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.to_string().into()
    })
}
