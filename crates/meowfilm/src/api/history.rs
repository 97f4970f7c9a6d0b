//! 搜索历史、播放历史与收藏接口
//!
//! 列表接口直接返回 JSON 数组，前端按数组读取。

use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;

use crate::api::request::{
    ApiJson, ApiQuery, FavoriteToggleRequest, KeywordQuery, KeywordRequest, LimitQuery, PlayRecordRequest, VideoQuery,
};
use crate::api::response::{EmptyResponse, FavoriteStatusResponse, FavoriteToggleResponse};
use crate::api::wrapper::{ApiError, ApiResponse};
use crate::auth::CurrentUser;
use crate::history::{
    Favorite, HistoryService, PlayRecord, FAVORITES_DEFAULT_LIMIT, PLAY_HISTORY_DEFAULT_LIMIT,
};

#[utoipa::path(
    get,
    path = "/api/searchhistory",
    responses(
        (status = 200, body = Vec<String>),
    ),
    security(("Token" = []))
)]
pub async fn get_search_history(
    CurrentUser(user): CurrentUser,
    Extension(history): Extension<Arc<HistoryService>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(history.search_keywords(user.id).await?))
}

/// 记录一次搜索，返回最新的历史列表
#[utoipa::path(
    post,
    path = "/api/searchhistory",
    request_body = KeywordRequest,
    responses(
        (status = 200, body = Vec<String>),
    ),
    security(("Token" = []))
)]
pub async fn add_search_history(
    CurrentUser(user): CurrentUser,
    Extension(history): Extension<Arc<HistoryService>>,
    ApiJson(params): ApiJson<KeywordRequest>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(history.record_search(user.id, &params.keyword).await?))
}

#[utoipa::path(
    delete,
    path = "/api/searchhistory",
    params(KeywordQuery),
    responses(
        (status = 200, body = Vec<String>),
    ),
    security(("Token" = []))
)]
pub async fn delete_search_history(
    CurrentUser(user): CurrentUser,
    Extension(history): Extension<Arc<HistoryService>>,
    ApiQuery(query): ApiQuery<KeywordQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(history.clear_search(user.id, query.keyword.as_deref()).await?))
}

#[utoipa::path(
    get,
    path = "/api/playhistory",
    params(LimitQuery),
    responses(
        (status = 200, body = Vec<PlayRecord>),
    ),
    security(("Token" = []))
)]
pub async fn get_play_history(
    CurrentUser(user): CurrentUser,
    Extension(history): Extension<Arc<HistoryService>>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> Result<Json<Vec<PlayRecord>>, ApiError> {
    let limit = query.limit_or(PLAY_HISTORY_DEFAULT_LIMIT);
    Ok(Json(history.play_history(user.id, limit).await?))
}

/// 上报播放进度，网盘内容不记录
#[utoipa::path(
    post,
    path = "/api/playhistory",
    request_body = PlayRecordRequest,
    responses(
        (status = 200, body = ApiResponse<EmptyResponse>),
    ),
    security(("Token" = []))
)]
pub async fn add_play_history(
    CurrentUser(user): CurrentUser,
    Extension(history): Extension<Arc<HistoryService>>,
    ApiJson(params): ApiJson<PlayRecordRequest>,
) -> Result<ApiResponse<EmptyResponse>, ApiError> {
    history.record_play(user.id, params.into()).await?;
    Ok(ApiResponse::ok(EmptyResponse {}))
}

/// 单部影片的播放记录，没有记录时返回 `null`
#[utoipa::path(
    get,
    path = "/api/playhistory/one",
    params(VideoQuery),
    responses(
        (status = 200, body = Option<PlayRecord>),
    ),
    security(("Token" = []))
)]
pub async fn get_play_record(
    CurrentUser(user): CurrentUser,
    Extension(history): Extension<Arc<HistoryService>>,
    ApiQuery(query): ApiQuery<VideoQuery>,
) -> Result<Json<Option<PlayRecord>>, ApiError> {
    Ok(Json(
        history.play_record(user.id, &query.site_key, &query.video_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/favorites",
    params(LimitQuery),
    responses(
        (status = 200, body = Vec<Favorite>),
    ),
    security(("Token" = []))
)]
pub async fn get_favorites(
    CurrentUser(user): CurrentUser,
    Extension(history): Extension<Arc<HistoryService>>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> Result<Json<Vec<Favorite>>, ApiError> {
    let limit = query.limit_or(FAVORITES_DEFAULT_LIMIT);
    Ok(Json(history.favorites(user.id, limit).await?))
}

#[utoipa::path(
    get,
    path = "/api/favorites/status",
    params(VideoQuery),
    responses(
        (status = 200, body = FavoriteStatusResponse),
    ),
    security(("Token" = []))
)]
pub async fn get_favorite_status(
    CurrentUser(user): CurrentUser,
    Extension(history): Extension<Arc<HistoryService>>,
    ApiQuery(query): ApiQuery<VideoQuery>,
) -> Result<Json<FavoriteStatusResponse>, ApiError> {
    Ok(Json(FavoriteStatusResponse {
        favorited: history.is_favorited(user.id, &query.site_key, &query.video_id).await?,
    }))
}

#[utoipa::path(
    post,
    path = "/api/favorites/toggle",
    request_body = FavoriteToggleRequest,
    responses(
        (status = 200, body = ApiResponse<FavoriteToggleResponse>),
    ),
    security(("Token" = []))
)]
pub async fn toggle_favorite(
    CurrentUser(user): CurrentUser,
    Extension(history): Extension<Arc<HistoryService>>,
    ApiJson(params): ApiJson<FavoriteToggleRequest>,
) -> Result<ApiResponse<FavoriteToggleResponse>, ApiError> {
    let favorited = history.toggle_favorite(user.id, params.into()).await?;
    Ok(ApiResponse::ok(FavoriteToggleResponse { favorited }))
}
