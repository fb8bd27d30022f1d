use core::fmt;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Closed set of permission tags the backend attaches to a user. Checks are
/// plain set membership: staff does not imply admin, routes that accept both
/// list both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_CLIENTE")]
    Customer,
    #[serde(rename = "ROLE_FUNCIONARIO")]
    Staff,
    #[serde(rename = "ROLE_ADMINISTRADOR")]
    Admin,
}

impl Role {
    /// Wire representation used in token claims and persisted profiles.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "ROLE_CLIENTE",
            Role::Staff => "ROLE_FUNCIONARIO",
            Role::Admin => "ROLE_ADMINISTRADOR",
        }
    }

    pub fn from_claim(value: &str) -> Option<Role> {
        match value {
            "ROLE_CLIENTE" => Some(Role::Customer),
            "ROLE_FUNCIONARIO" => Some(Role::Staff),
            "ROLE_ADMINISTRADOR" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Denormalized profile derived from token claims. Exists only while a
/// valid, unexpired token is stored; persisted under the `user` key so a
/// reload can show identity without re-decoding the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Resolved identifier (explicit claim id, falling back to the subject
    /// email). Stringified because it travels as a query parameter.
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub roles: HashSet<Role>,
}

impl AuthUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names_round_trip() {
        for role in [Role::Customer, Role::Staff, Role::Admin] {
            assert_eq!(Role::from_claim(role.as_str()), Some(role));
            let json = serde_json::to_string(&role).expect("serialize");
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn unknown_claim_string_is_rejected() {
        assert_eq!(Role::from_claim("ROLE_SUPERUSER"), None);
    }

    #[test]
    fn missing_roles_field_deserializes_to_empty_set() {
        let user: AuthUser =
            serde_json::from_str(r#"{"id":"7","email":"a@b.com"}"#).expect("deserialize");
        assert!(user.roles.is_empty());
    }
}
