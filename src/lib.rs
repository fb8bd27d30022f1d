pub mod auth;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

pub use state::AppState;
