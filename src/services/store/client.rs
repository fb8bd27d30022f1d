use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::storage::{keys, Storage};

use super::errors::ApiError;
use super::service::StoreApi;

/// Live HTTP client for the bookstore API. Holds a storage handle so the
/// stored bearer token rides along on every authenticated call, mirroring
/// the frontend's request interceptor.
#[derive(Clone)]
pub struct StoreApiClient {
    client: Client,
    base_url: String,
    storage: Storage,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

impl StoreApiClient {
    pub fn new(base_url: impl Into<String>, storage: Storage) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            storage,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string));
        Err(ApiError::from_status(status.as_u16(), message))
    }

    async fn post_order(&self, path: &str, email: &str, livro_id: i64) -> Result<(), ApiError> {
        let livro_id = livro_id.to_string();
        let mut request = self
            .client
            .post(self.url(path))
            .query(&[("email", email), ("livroId", livro_id.as_str())]);
        if let Some(token) = self.storage.get(keys::TOKEN) {
            request = request.bearer_auth(token);
        }

        debug!(path, email, livro_id = %livro_id, "Submitting order request");
        let response = request.send().await.map_err(ApiError::Connection)?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl StoreApi for StoreApiClient {
    async fn login(&self, email: &str, senha: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "senha": senha }))
            .send()
            .await
            .map_err(ApiError::Connection)?;
        let response = Self::check(response).await?;
        let body: LoginResponse = response.json().await.map_err(ApiError::InvalidResponse)?;
        Ok(body.token)
    }

    async fn purchase(&self, email: &str, livro_id: i64) -> Result<(), ApiError> {
        self.post_order("/venda/vender", email, livro_id).await
    }

    async fn rent(&self, email: &str, livro_id: i64) -> Result<(), ApiError> {
        self.post_order("/alugueis/alugar", email, livro_id).await
    }
}
