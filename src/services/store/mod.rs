pub mod client;
pub mod errors;
pub mod mock_store_api;
pub mod service;

pub use client::StoreApiClient;
pub use errors::ApiError;
pub use service::StoreApi;
