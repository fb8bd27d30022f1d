use core::fmt;

use thiserror::Error;
use tracing::{error, info};

use crate::auth::session::SessionManager;
use crate::cart::CartStore;
use crate::services::store::errors::ApiError;
use crate::services::store::service::StoreApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    Purchase,
    Rental,
}

impl fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutStage::Purchase => f.write_str("purchase"),
            CheckoutStage::Rental => f.write_str("rental"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to submit; no network call is made.
    #[error("the cart is empty")]
    EmptyCart,
    /// No authenticated user with a resolvable identifier; no network call
    /// is made.
    #[error("could not identify the signed-in user, sign in again")]
    UnidentifiedUser,
    /// A single item's request was rejected. Items before it already
    /// succeeded server-side; items after it were never submitted.
    #[error("{stage} of \"{title}\" failed: {source}")]
    Step {
        stage: CheckoutStage,
        livro_id: i64,
        title: String,
        #[source]
        source: ApiError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSummary {
    pub purchased: usize,
    pub rented: usize,
    pub total: f64,
}

/// Submits every cart item to the API, strictly sequentially and in cart
/// order: all purchases first, then all rentals, each awaited to completion
/// before the next is issued so server-side records land in a deterministic
/// order.
///
/// Not transactional: on a step failure the remaining items are never
/// attempted and both carts are left untouched so the customer can retry
/// (already-committed items would be resubmitted). Only on full success are
/// both carts cleared.
pub async fn finalize_order(
    api: &dyn StoreApi,
    session: &SessionManager,
    cart: &mut CartStore,
) -> Result<CheckoutSummary, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let user = session.user().ok_or(CheckoutError::UnidentifiedUser)?;
    if user.id.is_empty() {
        return Err(CheckoutError::UnidentifiedUser);
    }

    let summary = CheckoutSummary {
        purchased: cart.purchases().len(),
        rented: cart.rentals().len(),
        total: cart.total(),
    };

    for book in cart.purchases() {
        info!(livro_id = book.id, title = %book.title, "Submitting purchase");
        api.purchase(&user.id, book.id).await.map_err(|source| {
            error!(livro_id = book.id, %source, "Purchase step failed, aborting checkout");
            CheckoutError::Step {
                stage: CheckoutStage::Purchase,
                livro_id: book.id,
                title: book.title.clone(),
                source,
            }
        })?;
    }

    for book in cart.rentals() {
        info!(livro_id = book.id, title = %book.title, "Submitting rental");
        api.rent(&user.id, book.id).await.map_err(|source| {
            error!(livro_id = book.id, %source, "Rental step failed, aborting checkout");
            CheckoutError::Step {
                stage: CheckoutStage::Rental,
                livro_id: book.id,
                title: book.title.clone(),
                source,
            }
        })?;
    }

    cart.clear_purchases();
    cart.clear_rentals();
    info!(
        purchased = summary.purchased,
        rented = summary.rented,
        total = summary.total,
        "Checkout completed"
    );
    Ok(summary)
}
