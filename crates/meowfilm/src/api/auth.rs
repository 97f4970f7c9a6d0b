use std::sync::Arc;

use axum::extract::Extension;
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::IntoResponse;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::Modify;

use crate::api::error::InnerApiError;
use crate::api::request::{ApiJson, LoginRequest};
use crate::api::response::LoginResponse;
use crate::api::wrapper::{ApiError, ApiResponse};
use crate::auth::{token_from_headers, SessionManager, SESSION_COOKIE};

pub(super) struct OpenAPIAuth;

impl Modify for OpenAPIAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "Token",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

/// 登录并写入会话 Cookie
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, body = ApiResponse<LoginResponse>),
    )
)]
pub async fn login(
    Extension(sessions): Extension<Arc<SessionManager>>,
    ApiJson(params): ApiJson<LoginRequest>,
) -> Result<([(HeaderName, String); 1], ApiResponse<LoginResponse>), ApiError> {
    if params.username.trim().is_empty() || params.password.is_empty() {
        return Err(InnerApiError::BadRequest("用户名与密码不能为空".to_string()).into());
    }
    let (user, token) = sessions.login(&params.username, &params.password).await?;
    let cookie = sessions.session_cookie(token);
    Ok((
        [(SET_COOKIE, cookie.to_string())],
        ApiResponse::ok(LoginResponse {
            username: user.username,
            role: user.role,
        }),
    ))
}

/// 注销当前会话并回到首页
#[utoipa::path(
    get,
    path = "/api/logout",
    responses(
        (status = 302, description = "清除会话 Cookie 后重定向到 /"),
    )
)]
pub async fn logout(
    Extension(sessions): Extension<Arc<SessionManager>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = token_from_headers(&headers) {
        sessions.logout(&token).await?;
    }
    Ok((
        StatusCode::FOUND,
        [
            (SET_COOKIE, sessions.removal_cookie().to_string()),
            (LOCATION, "/".to_string()),
        ],
    ))
}
