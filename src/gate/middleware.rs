use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use super::decision::{decide, GateDecision};
use crate::{auth::cookie::token_from_cookie, state::AppState};

/// Runs [`decide`] on every request whose path is not excluded.
pub async fn request_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if state.config.gate_exclude.is_match(&path) {
        return next.run(request).await;
    }

    let token = token_from_cookie(request.headers());
    match decide(&path, token.as_deref(), state.auth.keys()) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RedirectTo(target) => {
            debug!(%path, %target, "gate redirect");
            Redirect::temporary(target).into_response()
        }
    }
}
