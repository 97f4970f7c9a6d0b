use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::api::error::InnerApiError;
use crate::auth::AuthError;
use crate::history::HistoryError;
use crate::settings::SiteSettingsError;
use crate::sites::SiteError;
use crate::users::UserError;

/// 成功响应：`{"success": true, ...data}`
#[derive(ToSchema, Serialize)]
pub struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "success": false, "message": message.into() }))).into_response()
}

#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(value: E) -> Self {
        Self(value.into())
    }
}

impl ApiError {
    /// 业务错误对应的状态码与提示，`None` 表示内部错误
    fn classify(&self) -> Option<(StatusCode, String)> {
        if let Some(inner) = self.0.downcast_ref::<InnerApiError>() {
            let status = match inner {
                InnerApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
                InnerApiError::Unauthorized => StatusCode::UNAUTHORIZED,
                InnerApiError::Forbidden => StatusCode::FORBIDDEN,
                InnerApiError::Rejected(_) => StatusCode::OK,
            };
            return Some((status, inner.to_string()));
        }
        if let Some(site) = self.0.downcast_ref::<SiteError>() {
            return match site {
                SiteError::UnknownSite(_) => Some((StatusCode::BAD_REQUEST, "站点不存在".to_string())),
                SiteError::InvalidInput(message) => Some((StatusCode::BAD_REQUEST, message.clone())),
                SiteError::ProviderRequired => Some((StatusCode::OK, site.to_string())),
                SiteError::UserNotFound(_) => Some((StatusCode::BAD_REQUEST, "用户不存在".to_string())),
                SiteError::Conflict(_) | SiteError::Database(_) => None,
            };
        }
        if let Some(auth) = self.0.downcast_ref::<AuthError>() {
            return match auth {
                AuthError::InvalidCredentials => Some((StatusCode::UNAUTHORIZED, auth.to_string())),
                AuthError::Disabled => Some((StatusCode::FORBIDDEN, auth.to_string())),
                AuthError::Hash(_) | AuthError::Database(_) => None,
            };
        }
        if let Some(user) = self.0.downcast_ref::<UserError>() {
            return match user {
                UserError::Database(_) => None,
                _ => Some((StatusCode::BAD_REQUEST, user.to_string())),
            };
        }
        if let Some(history) = self.0.downcast_ref::<HistoryError>() {
            return Some((StatusCode::BAD_REQUEST, history.to_string()));
        }
        if let Some(site_settings) = self.0.downcast_ref::<SiteSettingsError>() {
            return Some((StatusCode::BAD_REQUEST, site_settings.to_string()));
        }
        None
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.classify() {
            Some((status, message)) => {
                if status != StatusCode::OK && status.is_client_error() {
                    warn!("请求被拒绝 ({}): {}", status.as_u16(), message);
                }
                failure(status, message)
            }
            None => {
                error!("请求处理失败: {:#}", self.0);
                failure(StatusCode::INTERNAL_SERVER_ERROR, "请求失败")
            }
        }
    }
}
