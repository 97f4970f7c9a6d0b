//! 登录用户可用的站点接口

use std::sync::Arc;

use axum::extract::Extension;

use crate::api::request::{
    require_flag, ApiJson, ImportSitesRequest, SiteAvailabilityRequest, SiteHomeRequest, SiteOrderRequest, SiteStatusRequest,
};
use crate::api::response::{EmptyResponse, HomeSitesResponse, SiteOrderResponse, SitesResponse};
use crate::api::wrapper::{ApiError, ApiResponse};
use crate::auth::CurrentUser;
use crate::sites::{ImportOutcome, SiteService, UserSites};

/// 全局站点目录（不含搜索开关与错误信息）
#[utoipa::path(
    get,
    path = "/api/video/sites",
    responses(
        (status = 200, body = ApiResponse<SitesResponse>),
    ),
    security(("Token" = []))
)]
pub async fn get_video_sites(
    CurrentUser(_user): CurrentUser,
    Extension(sites): Extension<Arc<SiteService>>,
) -> Result<ApiResponse<SitesResponse>, ApiError> {
    Ok(ApiResponse::ok(SitesResponse {
        sites: sites.global_sites().await?,
    }))
}

/// 当前用户的首页站点
#[utoipa::path(
    get,
    path = "/api/home/sites",
    responses(
        (status = 200, body = ApiResponse<HomeSitesResponse>),
    ),
    security(("Token" = []))
)]
pub async fn get_home_sites(
    CurrentUser(user): CurrentUser,
    Extension(sites): Extension<Arc<SiteService>>,
) -> Result<ApiResponse<HomeSitesResponse>, ApiError> {
    Ok(ApiResponse::ok(HomeSitesResponse {
        sites: sites.user_home_sites(user.id).await?,
    }))
}

/// 当前用户视角下的站点目录
#[utoipa::path(
    get,
    path = "/api/user/sites",
    responses(
        (status = 200, body = ApiResponse<UserSites>),
    ),
    security(("Token" = []))
)]
pub async fn get_user_sites(
    CurrentUser(user): CurrentUser,
    Extension(sites): Extension<Arc<SiteService>>,
) -> Result<ApiResponse<UserSites>, ApiError> {
    sites.user_sites(user.id).await.map(ApiResponse::ok).map_err(ApiError::from)
}

#[utoipa::path(
    post,
    path = "/api/user/sites/status",
    request_body = SiteStatusRequest,
    responses(
        (status = 200, body = ApiResponse<EmptyResponse>),
    ),
    security(("Token" = []))
)]
pub async fn update_user_site_status(
    CurrentUser(user): CurrentUser,
    Extension(sites): Extension<Arc<SiteService>>,
    ApiJson(params): ApiJson<SiteStatusRequest>,
) -> Result<ApiResponse<EmptyResponse>, ApiError> {
    let enabled = require_flag(params.enabled)?;
    sites.set_user_status(user.id, &params.key, enabled).await?;
    Ok(ApiResponse::ok(EmptyResponse {}))
}

#[utoipa::path(
    post,
    path = "/api/user/sites/home",
    request_body = SiteHomeRequest,
    responses(
        (status = 200, body = ApiResponse<EmptyResponse>),
    ),
    security(("Token" = []))
)]
pub async fn update_user_site_home(
    CurrentUser(user): CurrentUser,
    Extension(sites): Extension<Arc<SiteService>>,
    ApiJson(params): ApiJson<SiteHomeRequest>,
) -> Result<ApiResponse<EmptyResponse>, ApiError> {
    let home = require_flag(params.home)?;
    sites.set_user_home(user.id, &params.key, home).await?;
    Ok(ApiResponse::ok(EmptyResponse {}))
}

#[utoipa::path(
    post,
    path = "/api/user/sites/availability",
    request_body = SiteAvailabilityRequest,
    responses(
        (status = 200, body = ApiResponse<EmptyResponse>),
    ),
    security(("Token" = []))
)]
pub async fn update_user_site_availability(
    CurrentUser(user): CurrentUser,
    Extension(sites): Extension<Arc<SiteService>>,
    ApiJson(params): ApiJson<SiteAvailabilityRequest>,
) -> Result<ApiResponse<EmptyResponse>, ApiError> {
    sites
        .set_user_availability(user.id, &params.key, params.availability())
        .await?;
    Ok(ApiResponse::ok(EmptyResponse {}))
}

#[utoipa::path(
    post,
    path = "/api/user/sites/order",
    request_body = SiteOrderRequest,
    responses(
        (status = 200, body = ApiResponse<SiteOrderResponse>),
    ),
    security(("Token" = []))
)]
pub async fn update_user_site_order(
    CurrentUser(user): CurrentUser,
    Extension(sites): Extension<Arc<SiteService>>,
    ApiJson(params): ApiJson<SiteOrderRequest>,
) -> Result<ApiResponse<SiteOrderResponse>, ApiError> {
    let order = params.into_order()?;
    let order = sites.set_user_order(user.id, &order).await?;
    Ok(ApiResponse::ok(SiteOrderResponse { order }))
}

/// 导入个人 CatPawOpen 的站点列表
#[utoipa::path(
    post,
    path = "/api/user/sites/import",
    request_body = ImportSitesRequest,
    responses(
        (status = 200, body = ApiResponse<ImportOutcome>),
    ),
    security(("Token" = []))
)]
pub async fn import_user_sites(
    CurrentUser(user): CurrentUser,
    Extension(sites): Extension<Arc<SiteService>>,
    ApiJson(params): ApiJson<ImportSitesRequest>,
) -> Result<ApiResponse<ImportOutcome>, ApiError> {
    let list = params.into_sites()?;
    sites
        .import_user_sites(user.id, list)
        .await
        .map(ApiResponse::ok)
        .map_err(ApiError::from)
}
