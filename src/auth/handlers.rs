use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        cookie::{auth_cookie, clear_auth_cookie},
        dto::{LoginRequest, LoginResponse, MeResponse},
        error::AuthError,
        extractors::AuthUser,
    },
    state::AppState,
};

const MISSING_FIELDS: &str = "Email and password are required";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<LoginResponse>), AuthError> {
    let payload = match payload {
        Ok(Json(p)) => p,
        Err(e) => {
            warn!(error = %e, "malformed login body");
            return Err(AuthError::Validation(MISSING_FIELDS));
        }
    };

    let (email, password) = match (payload.email, payload.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => return Err(AuthError::Validation(MISSING_FIELDS)),
    };

    let identity = state.auth.authenticate(&email, &password).await?;
    let token = state.auth.issue_token(&identity)?;

    let cookie = auth_cookie(
        &token,
        state.auth.keys().ttl(),
        state.config.environment.is_production(),
    )
    .map_err(|e| {
        error!(error = %e, "auth cookie header invalid");
        AuthError::Internal(e.into())
    })?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    info!(user_id = %identity.id, role = %identity.role, "user logged in");
    Ok((
        headers,
        Json(LoginResponse {
            message: "Login successful",
            user: identity,
        }),
    ))
}

/// Drops the cookie. Tokens already handed out stay valid until they expire.
pub async fn logout(State(state): State<AppState>) -> (StatusCode, HeaderMap) {
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        clear_auth_cookie(state.config.environment.is_production()),
    );
    (StatusCode::NO_CONTENT, headers)
}

#[instrument(skip(state, claims))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<MeResponse>, AuthError> {
    let user = state
        .auth
        .store()
        .find_by_id(claims.id)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %claims.id, "token for missing user");
            AuthError::Unauthenticated
        })?;

    Ok(Json(MeResponse {
        id: user.id,
        email: user.email,
        role: user.role,
        last_login: user.last_login,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::{Identity, Role};

    #[test]
    fn login_response_shape() {
        let response = LoginResponse {
            message: "Login successful",
            user: Identity {
                id: uuid::Uuid::new_v4(),
                email: "a@x.com".to_string(),
                role: Role::Admin,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["message"], "Login successful");
        assert_eq!(json["user"]["email"], "a@x.com");
        assert_eq!(json["user"]["role"], "admin");
        assert!(json["user"]["id"].is_string());
    }
}
