use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::auth::session::{SessionError, SessionManager};
use crate::cart::CartStore;
use crate::checkout::{self, CheckoutError, CheckoutSummary};
use crate::config::Config;
use crate::models::AuthUser;
use crate::services::store::client::StoreApiClient;
use crate::services::store::errors::ApiError;
use crate::services::store::service::StoreApi;
use crate::storage::Storage;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("login request failed: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Application-root context owning every stateful component. Constructed
/// once at startup and handed to consumers by reference; nothing in this
/// crate holds hidden global state.
pub struct AppState {
    pub config: Config,
    pub session: SessionManager,
    pub cart: CartStore,
    pub api: Arc<dyn StoreApi>,
}

impl AppState {
    pub fn new(config: Config) -> io::Result<Self> {
        let storage = Storage::open(&config.data_dir)?;
        let api = Arc::new(StoreApiClient::new(
            config.api_base_url.clone(),
            storage.clone(),
        ));
        Ok(Self::assemble(config, storage, api))
    }

    pub fn from_env() -> io::Result<Self> {
        Self::new(Config::from_env())
    }

    /// Wires an alternative API implementation over the same storage, used
    /// by tests and offline tooling.
    pub fn with_api(config: Config, api: Arc<dyn StoreApi>) -> io::Result<Self> {
        let storage = Storage::open(&config.data_dir)?;
        Ok(Self::assemble(config, storage, api))
    }

    fn assemble(config: Config, storage: Storage, api: Arc<dyn StoreApi>) -> Self {
        let mut session = SessionManager::new(storage.clone());
        session.initialize();
        let cart = CartStore::load(storage);
        Self {
            config,
            session,
            cart,
            api,
        }
    }

    /// Login-form flow: exchange credentials for a token, then establish the
    /// local session from it.
    pub async fn login(&mut self, email: &str, senha: &str) -> Result<AuthUser, LoginError> {
        let token = self.api.login(email, senha).await?;
        Ok(self.session.login(&token)?)
    }

    /// Checkout-button flow. Keeps the session consistent with the global
    /// 401 contract: an unauthorized step tears the local session down.
    pub async fn checkout(&mut self) -> Result<CheckoutSummary, CheckoutError> {
        let result =
            checkout::finalize_order(self.api.as_ref(), &self.session, &mut self.cart).await;
        if let Err(CheckoutError::Step { source, .. }) = &result {
            if source.invalidates_session() {
                self.session.invalidate();
            }
        }
        result
    }
}
