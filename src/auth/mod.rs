pub mod claims;
pub mod guard;
pub mod session;

pub use guard::RouteDecision;
pub use session::SessionManager;
