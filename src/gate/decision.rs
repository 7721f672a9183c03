use crate::auth::{jwt::TokenVerifier, repo_types::Role};

pub const SIGNIN_PATH: &str = "/signin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    PublicAuth,
    Admin,
    Member,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectTo(&'static str),
}

/// Prefix match, not segment match: `/administrator` is still admin ground.
pub fn classify(path: &str) -> PathClass {
    if path.starts_with("/admin") {
        PathClass::Admin
    } else if path.starts_with("/member") {
        PathClass::Member
    } else if path.contains("/signin") || path.contains("/signup") {
        PathClass::PublicAuth
    } else {
        PathClass::Other
    }
}

/// Decide what to do with a navigation to `path` carrying `token`.
///
/// Verification failures are treated exactly like a missing token.
pub fn decide<V: TokenVerifier + ?Sized>(
    path: &str,
    token: Option<&str>,
    verifier: &V,
) -> GateDecision {
    let claims = || token.and_then(|t| verifier.verify(t));

    match classify(path) {
        PathClass::Admin => match claims() {
            None => GateDecision::RedirectTo(SIGNIN_PATH),
            // profile pages are open to every signed-in role
            Some(c) if c.role != Role::Admin && !path.contains("profile") => {
                GateDecision::RedirectTo(Role::Member.dashboard())
            }
            Some(_) => GateDecision::Allow,
        },
        PathClass::Member => match claims() {
            None => GateDecision::RedirectTo(SIGNIN_PATH),
            Some(_) => GateDecision::Allow,
        },
        PathClass::PublicAuth => match claims() {
            Some(c) => GateDecision::RedirectTo(c.role.dashboard()),
            None => GateDecision::Allow,
        },
        PathClass::Other => GateDecision::Allow,
    }
}
