use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{claims::Claims, cookie::token_from_headers, error::AuthError, jwt::JwtKeys};

/// Verified claims from the `auth_token` cookie or a bearer header.
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(AuthError::Unauthenticated)?;
        let keys = JwtKeys::from_ref(state);
        match keys.verify(&token) {
            Some(claims) => Ok(AuthUser(claims)),
            None => {
                warn!("invalid or expired token");
                Err(AuthError::Unauthenticated)
            }
        }
    }
}
