use tracing::debug;

use crate::models::Book;
use crate::storage::{keys, Storage};

/// Rental price is a fixed fraction of the catalog purchase price.
pub const RENTAL_PRICE_FACTOR: f64 = 0.3;

/// Two independent, insertion-ordered cart collections (purchase and
/// rental), each deduplicated by book id and persisted after every
/// mutation. Loading falls back to empty on missing or corrupt data.
pub struct CartStore {
    storage: Storage,
    purchases: Vec<Book>,
    rentals: Vec<Book>,
}

impl CartStore {
    pub fn load(storage: Storage) -> Self {
        let purchases = storage.get_json(keys::CART).unwrap_or_default();
        let rentals = storage.get_json(keys::RENTAL_CART).unwrap_or_default();
        Self {
            storage,
            purchases,
            rentals,
        }
    }

    /// Appends unless a book with the same id is already present. Returns
    /// whether the cart changed.
    pub fn add_purchase(&mut self, book: Book) -> bool {
        if self.is_in_purchase(book.id) {
            debug!(livro_id = book.id, "Book already in purchase cart");
            return false;
        }
        self.purchases.push(book);
        self.persist_purchases();
        true
    }

    pub fn add_rental(&mut self, book: Book) -> bool {
        if self.is_in_rental(book.id) {
            debug!(livro_id = book.id, "Book already in rental cart");
            return false;
        }
        self.rentals.push(book);
        self.persist_rentals();
        true
    }

    pub fn remove_purchase(&mut self, livro_id: i64) {
        let before = self.purchases.len();
        self.purchases.retain(|book| book.id != livro_id);
        if self.purchases.len() != before {
            self.persist_purchases();
        }
    }

    pub fn remove_rental(&mut self, livro_id: i64) {
        let before = self.rentals.len();
        self.rentals.retain(|book| book.id != livro_id);
        if self.rentals.len() != before {
            self.persist_rentals();
        }
    }

    pub fn clear_purchases(&mut self) {
        self.purchases.clear();
        self.persist_purchases();
    }

    pub fn clear_rentals(&mut self) {
        self.rentals.clear();
        self.persist_rentals();
    }

    pub fn is_in_purchase(&self, livro_id: i64) -> bool {
        self.purchases.iter().any(|book| book.id == livro_id)
    }

    pub fn is_in_rental(&self, livro_id: i64) -> bool {
        self.rentals.iter().any(|book| book.id == livro_id)
    }

    pub fn purchases(&self) -> &[Book] {
        &self.purchases
    }

    pub fn rentals(&self) -> &[Book] {
        &self.rentals
    }

    pub fn item_count(&self) -> usize {
        self.purchases.len() + self.rentals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.purchases.is_empty() && self.rentals.is_empty()
    }

    pub fn purchase_total(&self) -> f64 {
        self.purchases.iter().map(|book| book.price).sum()
    }

    pub fn rental_total(&self) -> f64 {
        self.rentals
            .iter()
            .map(|book| book.price * RENTAL_PRICE_FACTOR)
            .sum()
    }

    pub fn total(&self) -> f64 {
        self.purchase_total() + self.rental_total()
    }

    fn persist_purchases(&self) {
        self.storage.set_json(keys::CART, &self.purchases);
    }

    fn persist_rentals(&self) {
        self.storage.set_json(keys::RENTAL_CART, &self.rentals);
    }
}
