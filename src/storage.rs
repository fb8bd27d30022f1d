use std::fs;
use std::io;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Keys this crate persists. Shared between the session, cart and API
/// layers, so concurrent writers (e.g. two app instances over the same data
/// directory) are last-writer-wins.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USER: &str = "user";
    pub const CART: &str = "cart";
    pub const RENTAL_CART: &str = "rentalCart";
}

/// Durable client-side key/value store: one file per key under a data
/// directory. Reads never fail — missing or unreadable data resolves to
/// `None` — and writes are best-effort, so callers stay infallible the way
/// the storefront expects.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    pub fn set(&self, key: &str, value: &str) {
        if let Err(error) = fs::write(self.path_for(key), value) {
            warn!(key, ?error, "Failed to persist value");
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(error) = fs::remove_file(self.path_for(key)) {
            if error.kind() != io::ErrorKind::NotFound {
                warn!(key, ?error, "Failed to remove persisted value");
            }
        }
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(key, ?error, "Discarding corrupt stored value");
                None
            }
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw),
            Err(error) => warn!(key, ?error, "Failed to serialize value for storage"),
        }
    }
}
