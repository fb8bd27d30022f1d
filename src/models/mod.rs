pub mod book;
pub mod user;

pub use book::Book;
pub use user::{AuthUser, Role};
