use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::claims::{Claims, ClaimsError};
use crate::auth::guard::{self, RouteDecision};
use crate::models::{AuthUser, Role};
use crate::storage::{keys, Storage};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session token")]
    InvalidToken(#[source] ClaimsError),
}

/// Holds the authenticated user derived from the stored bearer token.
///
/// Invariant: `user` is `Some` iff a token was present in storage and its
/// expiry was strictly in the future at the last check. Every downgrade to
/// anonymous also clears the persisted token and profile.
pub struct SessionManager {
    storage: Storage,
    user: Option<AuthUser>,
    loading: bool,
}

impl SessionManager {
    /// Starts in the loading state; route decisions are not trustworthy
    /// until `initialize` has run.
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            user: None,
            loading: true,
        }
    }

    /// Restores the session from the stored token. Absent token means an
    /// anonymous session; a malformed or expired token is downgraded to
    /// anonymous with a storage cleanup and never surfaces as an error.
    pub fn initialize(&mut self) {
        let Some(token) = self.storage.get(keys::TOKEN) else {
            debug!("No stored token, starting anonymous");
            self.loading = false;
            return;
        };

        match Claims::decode(&token) {
            Ok(claims) if claims.is_expired(Utc::now()) => {
                info!("Stored token expired, clearing session");
                self.clear();
            }
            Ok(claims) => {
                let user = claims.to_user();
                info!(email = %user.email, "Session restored from stored token");
                self.user = Some(user);
            }
            Err(error) => {
                warn!(?error, "Stored token is invalid, clearing session");
                self.clear();
            }
        }
        self.loading = false;
    }

    /// Stores a freshly issued token and derives the user from it. No expiry
    /// check is applied: the caller just obtained the token from a
    /// successful login call. Persists the denormalized profile alongside.
    pub fn login(&mut self, token: &str) -> Result<AuthUser, SessionError> {
        self.storage.set(keys::TOKEN, token);
        self.loading = false;

        match Claims::decode(token) {
            Ok(claims) => {
                let user = claims.to_user();
                self.storage.set_json(keys::USER, &user);
                info!(email = %user.email, "Logged in");
                self.user = Some(user.clone());
                Ok(user)
            }
            Err(error) => {
                warn!(?error, "Login token failed to decode, clearing session");
                self.clear();
                Err(SessionError::InvalidToken(error))
            }
        }
    }

    /// Callable at any time, including mid-request; in-flight requests are
    /// not cancelled but will fail authorization on the server afterwards.
    pub fn logout(&mut self) {
        info!("Logged out");
        self.clear();
    }

    /// Collaborator path for the global 401 handling: the API rejected the
    /// token, so the local session is torn down the same way as a logout.
    pub fn invalidate(&mut self) {
        warn!("Session rejected by the API, clearing");
        self.clear();
    }

    fn clear(&mut self) {
        self.storage.remove(keys::TOKEN);
        self.storage.remove(keys::USER);
        self.user = None;
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Pure membership test; `false` when anonymous.
    pub fn has_role(&self, role: Role) -> bool {
        self.user.as_ref().is_some_and(|user| user.has_role(role))
    }

    pub fn is_customer(&self) -> bool {
        self.has_role(Role::Customer)
    }

    pub fn is_staff(&self) -> bool {
        self.has_role(Role::Staff)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn route_decision(&self, allowed: &[Role]) -> RouteDecision {
        guard::evaluate(self.loading, self.user(), allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn open_temp() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::open(dir.path()).expect("storage");
        (dir, storage)
    }

    fn mint(claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"0123456789abcdef0123456789abcdef"),
        )
        .expect("token should encode")
    }

    fn future_exp() -> i64 {
        Utc::now().timestamp() + 3_600
    }

    #[test]
    fn starts_loading_and_anonymous() {
        let (_dir, storage) = open_temp();
        let session = SessionManager::new(storage);
        assert!(session.is_loading());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn initialize_without_token_is_anonymous() {
        let (_dir, storage) = open_temp();
        let mut session = SessionManager::new(storage);
        session.initialize();
        assert!(!session.is_loading());
        assert!(session.user().is_none());
    }

    #[test]
    fn initialize_restores_valid_stored_token() {
        let (_dir, storage) = open_temp();
        let token = mint(json!({
            "sub": "cliente@example.com",
            "exp": future_exp(),
            "id": 7,
            "roles": ["ROLE_CLIENTE"]
        }));
        storage.set(keys::TOKEN, &token);

        let mut session = SessionManager::new(storage);
        session.initialize();

        let user = session.user().expect("user");
        assert_eq!(user.id, "7");
        assert_eq!(user.email, "cliente@example.com");
        assert!(session.is_customer());
        assert!(!session.is_admin());
    }

    #[test]
    fn initialize_clears_expired_token() {
        let (_dir, storage) = open_temp();
        let token = mint(json!({
            "sub": "cliente@example.com",
            "exp": Utc::now().timestamp() - 60,
            "roles": ["ROLE_CLIENTE"]
        }));
        storage.set(keys::TOKEN, &token);

        let mut session = SessionManager::new(storage.clone());
        session.initialize();

        assert!(session.user().is_none());
        assert_eq!(storage.get(keys::TOKEN), None);
        assert_eq!(storage.get(keys::USER), None);
    }

    #[test]
    fn initialize_clears_malformed_token() {
        let (_dir, storage) = open_temp();
        storage.set(keys::TOKEN, "garbage");

        let mut session = SessionManager::new(storage.clone());
        session.initialize();

        assert!(session.user().is_none());
        assert!(!session.is_loading());
        assert_eq!(storage.get(keys::TOKEN), None);
    }

    #[test]
    fn login_persists_token_and_profile() {
        let (_dir, storage) = open_temp();
        let token = mint(json!({
            "sub": "staff@example.com",
            "exp": future_exp(),
            "userId": 3,
            "roles": ["ROLE_FUNCIONARIO"]
        }));

        let mut session = SessionManager::new(storage.clone());
        let user = session.login(&token).expect("login");

        assert_eq!(user.id, "3");
        assert!(session.is_staff());
        assert_eq!(storage.get(keys::TOKEN).as_deref(), Some(token.as_str()));

        let stored: AuthUser = storage.get_json(keys::USER).expect("stored profile");
        assert_eq!(stored, user);
    }

    #[test]
    fn login_with_malformed_token_downgrades_to_anonymous() {
        let (_dir, storage) = open_temp();
        let mut session = SessionManager::new(storage.clone());

        let error = session.login("garbage").expect_err("should fail");
        assert!(matches!(error, SessionError::InvalidToken(_)));
        assert!(session.user().is_none());
        assert_eq!(storage.get(keys::TOKEN), None);
    }

    #[test]
    fn logout_clears_everything() {
        let (_dir, storage) = open_temp();
        let token = mint(json!({
            "sub": "cliente@example.com",
            "exp": future_exp(),
            "roles": ["ROLE_CLIENTE"]
        }));

        let mut session = SessionManager::new(storage.clone());
        session.login(&token).expect("login");
        session.logout();

        assert!(session.user().is_none());
        assert_eq!(storage.get(keys::TOKEN), None);
        assert_eq!(storage.get(keys::USER), None);
    }

    #[test]
    fn has_role_is_false_for_anonymous_sessions() {
        let (_dir, storage) = open_temp();
        let mut session = SessionManager::new(storage);
        session.initialize();
        for role in [Role::Customer, Role::Staff, Role::Admin] {
            assert!(!session.has_role(role));
        }
    }

    #[test]
    fn token_without_roles_claim_grants_nothing() {
        let (_dir, storage) = open_temp();
        let token = mint(json!({
            "sub": "cliente@example.com",
            "exp": future_exp(),
            "id": 1
        }));

        let mut session = SessionManager::new(storage);
        session.login(&token).expect("login");

        assert!(session.is_authenticated());
        for role in [Role::Customer, Role::Staff, Role::Admin] {
            assert!(!session.has_role(role));
        }
    }
}
