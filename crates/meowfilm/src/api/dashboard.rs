//! 管理后台接口：全局站点目录、全局搜索设置、站点设置与用户管理

use std::sync::Arc;

use axum::extract::Extension;

use crate::api::request::{
    require_flag, AddUserRequest, ApiJson, ImportSitesRequest, SearchSettingsRequest, SiteCheckRequest, SiteHomeRequest,
    SiteOrderRequest, SiteSearchRequest, SiteSettingsRequest, SiteStatusRequest, UpdateUserRequest, UsernameRequest,
};
use crate::api::response::{
    DeleteUserResponse, EmptyResponse, SearchSettingsResponse, SiteOrderResponse, SiteSettingsResponse, SitesResponse,
    UpdateUserResponse, UserListResponse, UserStatusResponse,
};
use crate::api::wrapper::{ApiError, ApiResponse};
use crate::auth::AdminUser;
use crate::settings::{SettingsStore, SiteSettings};
use crate::sites::{CheckOutcome, ImportOutcome, SiteService};
use crate::users::{AddUser, UpdateUser, UserService};

/// 全局站点目录（含搜索开关与错误信息）
#[utoipa::path(
    get,
    path = "/dashboard/video/source/sites",
    responses(
        (status = 200, body = ApiResponse<SitesResponse>),
    ),
    security(("Token" = []))
)]
pub async fn get_source_sites(
    AdminUser(_admin): AdminUser,
    Extension(sites): Extension<Arc<SiteService>>,
) -> Result<ApiResponse<SitesResponse>, ApiError> {
    Ok(ApiResponse::ok(SitesResponse {
        sites: sites.dashboard_sites().await?,
    }))
}

#[utoipa::path(
    post,
    path = "/dashboard/video/source/sites/import",
    request_body = ImportSitesRequest,
    responses(
        (status = 200, body = ApiResponse<ImportOutcome>),
    ),
    security(("Token" = []))
)]
pub async fn import_source_sites(
    AdminUser(_admin): AdminUser,
    Extension(sites): Extension<Arc<SiteService>>,
    ApiJson(params): ApiJson<ImportSitesRequest>,
) -> Result<ApiResponse<ImportOutcome>, ApiError> {
    let list = params.into_sites()?;
    sites.import_global(list).await.map(ApiResponse::ok).map_err(ApiError::from)
}

#[utoipa::path(
    post,
    path = "/dashboard/video/source/sites/status",
    request_body = SiteStatusRequest,
    responses(
        (status = 200, body = ApiResponse<EmptyResponse>),
    ),
    security(("Token" = []))
)]
pub async fn update_source_site_status(
    AdminUser(_admin): AdminUser,
    Extension(sites): Extension<Arc<SiteService>>,
    ApiJson(params): ApiJson<SiteStatusRequest>,
) -> Result<ApiResponse<EmptyResponse>, ApiError> {
    let enabled = require_flag(params.enabled)?;
    sites.set_global_status(&params.key, enabled).await?;
    Ok(ApiResponse::ok(EmptyResponse {}))
}

#[utoipa::path(
    post,
    path = "/dashboard/video/source/sites/home",
    request_body = SiteHomeRequest,
    responses(
        (status = 200, body = ApiResponse<EmptyResponse>),
    ),
    security(("Token" = []))
)]
pub async fn update_source_site_home(
    AdminUser(_admin): AdminUser,
    Extension(sites): Extension<Arc<SiteService>>,
    ApiJson(params): ApiJson<SiteHomeRequest>,
) -> Result<ApiResponse<EmptyResponse>, ApiError> {
    let home = require_flag(params.home)?;
    sites.set_global_home(&params.key, home).await?;
    Ok(ApiResponse::ok(EmptyResponse {}))
}

#[utoipa::path(
    post,
    path = "/dashboard/video/source/sites/search",
    request_body = SiteSearchRequest,
    responses(
        (status = 200, body = ApiResponse<EmptyResponse>),
    ),
    security(("Token" = []))
)]
pub async fn update_source_site_search(
    AdminUser(_admin): AdminUser,
    Extension(sites): Extension<Arc<SiteService>>,
    ApiJson(params): ApiJson<SiteSearchRequest>,
) -> Result<ApiResponse<EmptyResponse>, ApiError> {
    let search = require_flag(params.search)?;
    sites.set_global_search(&params.key, search).await?;
    Ok(ApiResponse::ok(EmptyResponse {}))
}

#[utoipa::path(
    post,
    path = "/dashboard/video/source/sites/order",
    request_body = SiteOrderRequest,
    responses(
        (status = 200, body = ApiResponse<SiteOrderResponse>),
    ),
    security(("Token" = []))
)]
pub async fn update_source_site_order(
    AdminUser(_admin): AdminUser,
    Extension(sites): Extension<Arc<SiteService>>,
    ApiJson(params): ApiJson<SiteOrderRequest>,
) -> Result<ApiResponse<SiteOrderResponse>, ApiError> {
    let order = params.into_order()?;
    let order = sites.set_global_order(&order).await?;
    Ok(ApiResponse::ok(SiteOrderResponse { order }))
}

/// 写入可用性检测结果
#[utoipa::path(
    post,
    path = "/dashboard/video/source/sites/check",
    request_body = SiteCheckRequest,
    responses(
        (status = 200, body = ApiResponse<CheckOutcome>),
    ),
    security(("Token" = []))
)]
pub async fn check_source_sites(
    AdminUser(_admin): AdminUser,
    Extension(sites): Extension<Arc<SiteService>>,
    ApiJson(params): ApiJson<SiteCheckRequest>,
) -> Result<ApiResponse<CheckOutcome>, ApiError> {
    let (results, errors) = params.into_parts();
    sites
        .check_global(results, errors)
        .await
        .map(ApiResponse::ok)
        .map_err(ApiError::from)
}

#[utoipa::path(
    get,
    path = "/dashboard/search/settings",
    responses(
        (status = 200, body = ApiResponse<SearchSettingsResponse>),
    ),
    security(("Token" = []))
)]
pub async fn get_search_settings(
    AdminUser(_admin): AdminUser,
    Extension(sites): Extension<Arc<SiteService>>,
) -> Result<ApiResponse<SearchSettingsResponse>, ApiError> {
    let (rows, search) = sites.global_search_settings().await?;
    Ok(ApiResponse::ok(SearchSettingsResponse {
        sites: Some(rows),
        search,
    }))
}

#[utoipa::path(
    post,
    path = "/dashboard/search/settings",
    request_body = SearchSettingsRequest,
    responses(
        (status = 200, body = ApiResponse<SearchSettingsResponse>),
    ),
    security(("Token" = []))
)]
pub async fn update_search_settings(
    AdminUser(_admin): AdminUser,
    Extension(sites): Extension<Arc<SiteService>>,
    ApiJson(params): ApiJson<SearchSettingsRequest>,
) -> Result<ApiResponse<SearchSettingsResponse>, ApiError> {
    let search = sites
        .save_global_search_settings(&params.order(), &params.cover_site)
        .await?;
    Ok(ApiResponse::ok(SearchSettingsResponse { sites: None, search }))
}

#[utoipa::path(
    get,
    path = "/dashboard/site/settings",
    responses(
        (status = 200, body = ApiResponse<SiteSettingsResponse>),
    ),
    security(("Token" = []))
)]
pub async fn get_site_settings(
    AdminUser(_admin): AdminUser,
    Extension(settings): Extension<Arc<SettingsStore>>,
) -> Result<ApiResponse<SiteSettingsResponse>, ApiError> {
    Ok(ApiResponse::ok(SiteSettingsResponse {
        settings: SiteSettings::load(&settings).await?,
    }))
}

/// 保存站点名称与豆瓣代理，站点名称为空时保持原值
#[utoipa::path(
    post,
    path = "/dashboard/site/save",
    request_body = SiteSettingsRequest,
    responses(
        (status = 200, body = ApiResponse<SiteSettingsResponse>),
    ),
    security(("Token" = []))
)]
pub async fn save_site_settings(
    AdminUser(_admin): AdminUser,
    Extension(settings): Extension<Arc<SettingsStore>>,
    ApiJson(params): ApiJson<SiteSettingsRequest>,
) -> Result<ApiResponse<SiteSettingsResponse>, ApiError> {
    Ok(ApiResponse::ok(SiteSettingsResponse {
        settings: SiteSettings::save(&settings, params.into()).await?,
    }))
}

#[utoipa::path(
    get,
    path = "/dashboard/user/list",
    responses(
        (status = 200, body = ApiResponse<UserListResponse>),
    ),
    security(("Token" = []))
)]
pub async fn list_users(
    AdminUser(_admin): AdminUser,
    Extension(users): Extension<Arc<UserService>>,
) -> Result<ApiResponse<UserListResponse>, ApiError> {
    let users = users.list().await?;
    Ok(ApiResponse::ok(UserListResponse {
        user_count: users.len(),
        users,
    }))
}

#[utoipa::path(
    post,
    path = "/dashboard/user/add",
    request_body = AddUserRequest,
    responses(
        (status = 200, body = ApiResponse<EmptyResponse>),
    ),
    security(("Token" = []))
)]
pub async fn add_user(
    AdminUser(_admin): AdminUser,
    Extension(users): Extension<Arc<UserService>>,
    ApiJson(params): ApiJson<AddUserRequest>,
) -> Result<ApiResponse<EmptyResponse>, ApiError> {
    users
        .add(AddUser {
            username: params.username,
            password: params.password,
            role: params.role,
            cat_api_base: params.cat_api_base,
            cat_proxy: params.cat_proxy,
        })
        .await?;
    Ok(ApiResponse::ok(EmptyResponse {}))
}

/// 切换用户的启用状态
#[utoipa::path(
    post,
    path = "/dashboard/user/ban",
    request_body = UsernameRequest,
    responses(
        (status = 200, body = ApiResponse<UserStatusResponse>),
    ),
    security(("Token" = []))
)]
pub async fn ban_user(
    AdminUser(_admin): AdminUser,
    Extension(users): Extension<Arc<UserService>>,
    ApiJson(params): ApiJson<UsernameRequest>,
) -> Result<ApiResponse<UserStatusResponse>, ApiError> {
    let status = users.toggle_ban(&params.username).await?;
    Ok(ApiResponse::ok(UserStatusResponse {
        status: status.to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/dashboard/user/delete",
    request_body = UsernameRequest,
    responses(
        (status = 200, body = ApiResponse<DeleteUserResponse>),
    ),
    security(("Token" = []))
)]
pub async fn delete_user(
    AdminUser(_admin): AdminUser,
    Extension(users): Extension<Arc<UserService>>,
    ApiJson(params): ApiJson<UsernameRequest>,
) -> Result<ApiResponse<DeleteUserResponse>, ApiError> {
    let deleted = users.delete(&params.username).await?;
    Ok(ApiResponse::ok(DeleteUserResponse { deleted }))
}

#[utoipa::path(
    post,
    path = "/dashboard/user/update",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, body = ApiResponse<UpdateUserResponse>),
    ),
    security(("Token" = []))
)]
pub async fn update_user(
    AdminUser(_admin): AdminUser,
    Extension(users): Extension<Arc<UserService>>,
    ApiJson(params): ApiJson<UpdateUserRequest>,
) -> Result<ApiResponse<UpdateUserResponse>, ApiError> {
    let user = users
        .update(UpdateUser {
            username: params.username,
            new_username: params.new_username,
            new_password: params.new_password,
            role: params.role,
            cat_api_base: params.cat_api_base,
            cat_proxy: params.cat_proxy,
        })
        .await?;
    Ok(ApiResponse::ok(UpdateUserResponse { user }))
}
