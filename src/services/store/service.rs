use async_trait::async_trait;

use super::errors::ApiError;

/// Remote bookstore API surface this core depends on. Any non-2xx response
/// is a failure for the operation in question.
#[async_trait]
pub trait StoreApi: Send + Sync {
    /// `POST /auth/login` — exchanges credentials for a bearer token.
    async fn login(&self, email: &str, senha: &str) -> Result<String, ApiError>;

    /// `POST /venda/vender?email=&livroId=` — records one purchase for the
    /// identified client.
    async fn purchase(&self, email: &str, livro_id: i64) -> Result<(), ApiError>;

    /// `POST /alugueis/alugar?email=&livroId=` — records one rental for the
    /// identified client.
    async fn rent(&self, email: &str, livro_id: i64) -> Result<(), ApiError>;
}
