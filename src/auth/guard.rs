use crate::models::{AuthUser, Role};

/// Outcome of a route-guard evaluation. Exactly one variant applies to any
/// (loading, user, allowed-roles) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session restore has not finished yet; render a neutral placeholder
    /// instead of redirecting before the stored token was checked.
    Loading,
    /// No authenticated user; send the visitor to the login entry point.
    /// The original destination is not preserved.
    RedirectToLogin,
    /// Authenticated but holding none of the allowed roles; rendered in
    /// place as a 403, no redirect.
    Forbidden,
    Allow,
}

/// Per-navigation access decision. An empty `allowed` slice means any
/// authenticated user may pass.
pub fn evaluate(loading: bool, user: Option<&AuthUser>, allowed: &[Role]) -> RouteDecision {
    if loading {
        return RouteDecision::Loading;
    }

    let Some(user) = user else {
        return RouteDecision::RedirectToLogin;
    };

    if !allowed.is_empty() && !allowed.iter().any(|role| user.has_role(*role)) {
        return RouteDecision::Forbidden;
    }

    RouteDecision::Allow
}
