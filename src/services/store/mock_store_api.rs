use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use super::errors::ApiError;
use super::service::StoreApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Login { email: String },
    Purchase { email: String, livro_id: i64 },
    Rent { email: String, livro_id: i64 },
}

/// Scripted in-memory stand-in for the bookstore API. Records every call in
/// order and fails the configured book ids, so checkout sequencing and
/// partial-failure behavior can be exercised without a server.
#[derive(Default)]
pub struct MockStoreApi {
    pub token: String,
    pub fail_purchases: HashSet<i64>,
    pub fail_rentals: HashSet<i64>,
    /// Status used for scripted failures; defaults to a plain rejection.
    pub failure_status: Option<u16>,
    pub failure_message: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockStoreApi {
    pub fn issuing(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }

    fn failure(&self) -> ApiError {
        ApiError::from_status(
            self.failure_status.unwrap_or(400),
            self.failure_message.clone(),
        )
    }
}

#[async_trait]
impl StoreApi for MockStoreApi {
    async fn login(&self, email: &str, _senha: &str) -> Result<String, ApiError> {
        self.record(RecordedCall::Login {
            email: email.to_string(),
        });
        Ok(self.token.clone())
    }

    async fn purchase(&self, email: &str, livro_id: i64) -> Result<(), ApiError> {
        self.record(RecordedCall::Purchase {
            email: email.to_string(),
            livro_id,
        });
        if self.fail_purchases.contains(&livro_id) {
            return Err(self.failure());
        }
        Ok(())
    }

    async fn rent(&self, email: &str, livro_id: i64) -> Result<(), ApiError> {
        self.record(RecordedCall::Rent {
            email: email.to_string(),
            livro_id,
        });
        if self.fail_rentals.contains(&livro_id) {
            return Err(self.failure());
        }
        Ok(())
    }
}
