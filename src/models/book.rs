use serde::{Deserialize, Serialize};

/// Catalog entry as referenced by the carts. Field names follow the
/// backend's Portuguese wire format so persisted carts stay byte-compatible
/// with what the API returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "autor")]
    pub author: String,
    #[serde(rename = "genero")]
    pub genre: String,
    #[serde(rename = "preco")]
    pub price: f64,
}
