use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Json, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
};

use crate::dto::user_dto::{ChangePasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest};
use crate::model::user::{User, ROLE_USER};
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::error::{validate_payload, ApiJson, HandlerError};
use crate::util::jwt::Claims;

pub const REFRESH_COOKIE: &str = "refreshToken";

fn refresh_cookie(token: &str, max_age: i64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/api/auth; SameSite=Lax; Max-Age={}",
        REFRESH_COOKIE, token, max_age
    )
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub async fn register_handler(
    State(service): State<Arc<UserServiceImpl>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let user = User {
        id: None,
        username: payload.username,
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        password_hash: String::new(),
        role: ROLE_USER.to_string(),
        created_at: None,
        updated_at: None,
    };
    let res = service.register(user, payload.password).await?;
    let cookie = refresh_cookie(&res.tokens.refresh_token, service.refresh_token_max_age());
    Ok((StatusCode::CREATED, [(header::SET_COOKIE, cookie)], Json(res)))
}

pub async fn login_handler(
    State(service): State<Arc<UserServiceImpl>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let res = service.login(payload.email, payload.password).await?;
    let cookie = refresh_cookie(&res.tokens.refresh_token, service.refresh_token_max_age());
    Ok(([(header::SET_COOKIE, cookie)], Json(res)))
}

/// Accepts the token in the JSON body or, failing that, in the cookie.
pub async fn refresh_token_handler(
    State(service): State<Arc<UserServiceImpl>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HandlerError> {
    let payload: RefreshTokenRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RefreshTokenRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| HandlerError::bad_request(format!("Invalid JSON body: {}", e)))?
    };
    let token = payload
        .refresh_token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| cookie_value(&headers, REFRESH_COOKIE))
        .ok_or_else(|| HandlerError::unauthorized("Refresh token is required"))?;

    let tokens = service.refresh_token(token).await?;
    let cookie = refresh_cookie(&tokens.refresh_token, service.refresh_token_max_age());
    Ok(([(header::SET_COOKIE, cookie)], Json(tokens)))
}

pub async fn logout_handler() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, refresh_cookie("", 0))],
        Json(serde_json::json!({ "message": "Logged out" })),
    )
}

pub async fn me_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.me(&claims.sub).await?))
}

pub async fn change_password_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    service
        .change_password(&claims.sub, payload.current_password, payload.new_password)
        .await?;
    Ok(Json(serde_json::json!({ "message": "Password changed" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; refreshToken=abc.def.ghi"));
        assert_eq!(cookie_value(&headers, REFRESH_COOKIE).as_deref(), Some("abc.def.ghi"));
        assert_eq!(cookie_value(&headers, "session"), None);
    }

    #[test]
    fn test_logout_cookie_expires_immediately() {
        assert!(refresh_cookie("", 0).ends_with("Max-Age=0"));
    }
}
