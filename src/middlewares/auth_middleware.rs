use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use tracing::warn;

use crate::model::user::ROLE_ADMIN;
use crate::util::error::HandlerError;
use crate::util::jwt::{Claims, JwtTokenUtils, JwtTokenUtilsImpl};

pub struct AuthState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

fn authenticate(state: &AuthState, req: &Request<Body>) -> Result<Claims, HandlerError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HandlerError::unauthorized("Missing authorization header"))?;
    let token = state
        .jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|_| HandlerError::unauthorized("Malformed authorization header"))?;
    state.jwt_utils.validate_access_token(&token).map_err(|e| {
        warn!("Rejected access token: {}", e);
        HandlerError::unauthorized("Invalid or expired token")
    })
}

/// Requires a valid access token and exposes its claims to the handlers.
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let claims = authenticate(&state, &req)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Like `require_auth`, and the token must carry the admin role.
pub async fn require_admin(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let claims = authenticate(&state, &req)?;
    if claims.role != ROLE_ADMIN {
        warn!(user = %claims.sub, "Admin route refused");
        return Err(HandlerError::forbidden("Admin role required"));
    }
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
