// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unverified JWT claims decoding.
//!
//! Tokens handled here were issued directly to this confidential client over
//! TLS and are only mined for claim values (subject id, display name); the
//! resource server performs its own signature validation. The payload is the
//! second dot-separated segment, base64url-encoded JSON.

use base64::Engine;
use serde::Deserialize;

use govchat_core::GovchatError;

/// Claims of interest from an access or id token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claims {
    /// Directory object id; the preferred stable subject id.
    #[serde(default)]
    pub oid: Option<String>,
    /// Standard subject claim; fallback when `oid` is absent.
    #[serde(default)]
    pub sub: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Sign-in name.
    #[serde(default)]
    pub preferred_username: Option<String>,
    /// Expiry as a unix timestamp.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// The stable subject id: `oid` falling back to `sub`.
    ///
    /// Deterministic for a fixed token; callers derive the governance
    /// owner id from this.
    pub fn user_id(&self) -> Option<&str> {
        self.oid.as_deref().or(self.sub.as_deref())
    }
}

/// Decode the payload segment of a JWT without verifying its signature.
///
/// Fails with [`GovchatError::IdentityResolution`] when the token is not a
/// three-segment JWT or the payload is not base64url JSON.
pub fn decode_claims(token: &str) -> Result<Claims, GovchatError> {
    let bytes = payload_bytes(token)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        GovchatError::IdentityResolution(format!("token payload is not claim JSON: {e}"))
    })
}

/// Decode the full payload as arbitrary JSON, for diagnostic endpoints that
/// echo the claims back to the caller.
pub fn decode_claims_json(token: &str) -> Result<serde_json::Value, GovchatError> {
    let bytes = payload_bytes(token)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        GovchatError::IdentityResolution(format!("token payload is not claim JSON: {e}"))
    })
}

fn payload_bytes(token: &str) -> Result<Vec<u8>, GovchatError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| GovchatError::IdentityResolution("token is not a JWT".to_string()))?;

    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| {
            GovchatError::IdentityResolution(format!("token payload is not base64url: {e}"))
        })
}

/// Builds an unsigned JWT with the given payload JSON. Test helper.
#[cfg(test)]
pub(crate) fn fake_jwt(payload: &serde_json::Value) -> String {
    let engine = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let body = engine.encode(payload.to_string());
    format!("{header}.{body}.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_oid_and_name() {
        let token = fake_jwt(&serde_json::json!({
            "oid": "user-object-id",
            "sub": "subject-id",
            "name": "Ada Lovelace",
            "preferred_username": "ada@contoso.com",
            "exp": 1_900_000_000i64,
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.user_id(), Some("user-object-id"));
        assert_eq!(claims.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(
            claims.preferred_username.as_deref(),
            Some("ada@contoso.com")
        );
    }

    #[test]
    fn user_id_falls_back_to_sub() {
        let token = fake_jwt(&serde_json::json!({ "sub": "subject-only" }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.user_id(), Some("subject-only"));
    }

    #[test]
    fn user_id_is_deterministic_for_fixed_token() {
        let token = fake_jwt(&serde_json::json!({ "oid": "stable-id" }));
        let first = decode_claims(&token).unwrap().user_id().map(String::from);
        let second = decode_claims(&token).unwrap().user_id().map(String::from);
        assert_eq!(first, second);
        assert_eq!(first.as_deref(), Some("stable-id"));
    }

    #[test]
    fn rejects_non_jwt() {
        assert!(decode_claims("not-a-jwt").is_err());
        assert!(decode_claims("").is_err());
    }

    #[test]
    fn rejects_garbled_payload() {
        let err = decode_claims("aGVhZGVy.!!!!.c2ln").unwrap_err();
        assert!(matches!(err, GovchatError::IdentityResolution(_)));
    }

    #[test]
    fn decode_claims_json_round_trips_payload() {
        let payload = serde_json::json!({ "oid": "x", "tid": "tenant" });
        let token = fake_jwt(&payload);
        let value = decode_claims_json(&token).unwrap();
        assert_eq!(value, payload);
    }
}
