use core::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{AuthUser, Role};

#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("token has no payload segment")]
    MalformedToken,
    #[error("token payload is not valid base64")]
    PayloadEncoding(#[source] base64::DecodeError),
    #[error("token payload is not a valid claims object")]
    PayloadJson(#[source] serde_json::Error),
}

/// Identifier claim that different backend versions emit either as a JSON
/// number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubjectId {
    Number(i64),
    Text(String),
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectId::Number(n) => write!(f, "{}", n),
            SubjectId::Text(s) => f.write_str(s),
        }
    }
}

/// Decoded bearer-token payload. Only the claims the client derives state
/// from are modeled; signature verification stays on the server, the client
/// treats the token as opaque beyond this read.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Subject: the account email.
    pub sub: String,
    /// Expiry as UNIX seconds.
    pub exp: i64,
    #[serde(default)]
    pub id: Option<SubjectId>,
    #[serde(default, rename = "userId")]
    pub user_id: Option<SubjectId>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

impl Claims {
    /// Reads the payload segment of a JWT without verifying the signature.
    /// Segment layout is tolerated loosely: only the second dot-separated
    /// segment is consumed.
    pub fn decode(token: &str) -> Result<Self, ClaimsError> {
        let payload = token.split('.').nth(1).ok_or(ClaimsError::MalformedToken)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(ClaimsError::PayloadEncoding)?;
        serde_json::from_slice(&bytes).map_err(ClaimsError::PayloadJson)
    }

    /// A token is valid only while its expiry is strictly in the future.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// Derives the user profile. Identifier fallback chain: explicit `id`,
    /// then `userId`, then the subject email. Roles default to the empty set
    /// when the claim is absent; unknown role strings are dropped.
    pub fn to_user(&self) -> AuthUser {
        let id = self
            .id
            .as_ref()
            .or(self.user_id.as_ref())
            .map(ToString::to_string)
            .unwrap_or_else(|| self.sub.clone());

        let roles = self
            .roles
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter_map(|raw| {
                let role = Role::from_claim(raw);
                if role.is_none() {
                    debug!(role = %raw, "Ignoring unknown role claim");
                }
                role
            })
            .collect();

        AuthUser {
            id,
            email: self.sub.clone(),
            roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn mint(claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"0123456789abcdef0123456789abcdef"),
        )
        .expect("token should encode")
    }

    #[test]
    fn decodes_a_real_hs256_token() {
        let token = mint(json!({
            "sub": "cliente@example.com",
            "exp": 4_102_444_800i64,
            "id": 42,
            "roles": ["ROLE_CLIENTE"]
        }));

        let claims = Claims::decode(&token).expect("decode");
        assert_eq!(claims.sub, "cliente@example.com");
        assert_eq!(claims.exp, 4_102_444_800);

        let user = claims.to_user();
        assert_eq!(user.id, "42");
        assert_eq!(user.email, "cliente@example.com");
        assert!(user.has_role(Role::Customer));
    }

    #[test]
    fn identifier_falls_back_to_user_id_then_subject() {
        let with_user_id = Claims::decode(&mint(json!({
            "sub": "a@b.com", "exp": 4_102_444_800i64, "userId": "17"
        })))
        .expect("decode");
        assert_eq!(with_user_id.to_user().id, "17");

        let bare = Claims::decode(&mint(json!({
            "sub": "a@b.com", "exp": 4_102_444_800i64
        })))
        .expect("decode");
        assert_eq!(bare.to_user().id, "a@b.com");
    }

    #[test]
    fn explicit_id_wins_over_user_id() {
        let claims = Claims::decode(&mint(json!({
            "sub": "a@b.com", "exp": 4_102_444_800i64, "id": 5, "userId": 9
        })))
        .expect("decode");
        assert_eq!(claims.to_user().id, "5");
    }

    #[test]
    fn missing_roles_claim_yields_empty_set() {
        let claims = Claims::decode(&mint(json!({
            "sub": "a@b.com", "exp": 4_102_444_800i64
        })))
        .expect("decode");
        let user = claims.to_user();
        assert!(user.roles.is_empty());
        assert!(!user.has_role(Role::Customer));
        assert!(!user.has_role(Role::Staff));
        assert!(!user.has_role(Role::Admin));
    }

    #[test]
    fn unknown_role_strings_are_dropped() {
        let claims = Claims::decode(&mint(json!({
            "sub": "a@b.com",
            "exp": 4_102_444_800i64,
            "roles": ["ROLE_FUNCIONARIO", "ROLE_SUPERUSER"]
        })))
        .expect("decode");
        let user = claims.to_user();
        assert_eq!(user.roles.len(), 1);
        assert!(user.has_role(Role::Staff));
    }

    #[test]
    fn rejects_tokens_without_a_payload_segment() {
        assert!(matches!(
            Claims::decode("not-a-jwt"),
            Err(ClaimsError::MalformedToken)
        ));
    }

    #[test]
    fn rejects_non_base64_payloads() {
        assert!(matches!(
            Claims::decode("header.!!!.signature"),
            Err(ClaimsError::PayloadEncoding(_))
        ));
    }

    #[test]
    fn rejects_payloads_that_are_not_claims() {
        let payload = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        let token = format!("h.{}.s", payload);
        assert!(matches!(
            Claims::decode(&token),
            Err(ClaimsError::PayloadJson(_))
        ));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let claims = Claims::decode(&mint(json!({
            "sub": "a@b.com", "exp": 1_000i64
        })))
        .expect("decode");

        let at_expiry = Utc.timestamp_opt(1_000, 0).unwrap();
        let just_before = Utc.timestamp_opt(999, 0).unwrap();
        assert!(claims.is_expired(at_expiry));
        assert!(!claims.is_expired(just_before));
    }
}
