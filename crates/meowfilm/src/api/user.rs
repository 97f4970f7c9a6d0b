//! 个人设置接口

use std::sync::Arc;

use axum::extract::Extension;
use serde_json::Value;

use crate::api::error::InnerApiError;
use crate::api::request::ApiJson;
use crate::api::response::{SaveUserSettingsResponse, UserSettingsResponse};
use crate::api::wrapper::{ApiError, ApiResponse};
use crate::auth::CurrentUser;
use crate::users::{SettingsUpdate, UserService, UserSettings};

#[utoipa::path(
    get,
    path = "/api/user/settings",
    responses(
        (status = 200, body = ApiResponse<UserSettingsResponse>),
    ),
    security(("Token" = []))
)]
pub async fn get_user_settings(
    CurrentUser(user): CurrentUser,
    Extension(users): Extension<Arc<UserService>>,
) -> Result<ApiResponse<UserSettingsResponse>, ApiError> {
    Ok(ApiResponse::ok(UserSettingsResponse {
        settings: users.settings(user.id).await?,
    }))
}

/// 保存个人设置，携带 `sites` 时同时合并站点列表
#[utoipa::path(
    put,
    path = "/api/user/settings",
    request_body = UserSettings,
    responses(
        (status = 200, body = ApiResponse<SaveUserSettingsResponse>),
    ),
    security(("Token" = []))
)]
pub async fn update_user_settings(
    CurrentUser(user): CurrentUser,
    Extension(users): Extension<Arc<UserService>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<ApiResponse<SaveUserSettingsResponse>, ApiError> {
    let Some(body) = body.as_object() else {
        return Err(InnerApiError::BadRequest("参数无效".to_string()).into());
    };
    let sites_sync = users.save_settings(user.id, SettingsUpdate::from_json(body)).await?;
    Ok(ApiResponse::ok(SaveUserSettingsResponse {
        settings: users.settings(user.id).await?,
        sites_sync,
    }))
}
