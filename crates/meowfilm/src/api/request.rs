use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::api::error::InnerApiError;
use crate::api::wrapper::ApiError;
use crate::history::{NewFavorite, NewPlayRecord};
use crate::settings::SiteSettingsUpdate;
use crate::sites::{sites_from_value, Availability, Site};
use crate::utils::convert::{
    deserialize_loose_bool, deserialize_loose_string, int_from_value_floor, string_array_from_value, value_to_string,
};

/// 请求体上限
const MAX_BODY_BYTES: usize = 1 << 20;

/// 宽松的 JSON 请求体：不要求 Content-Type，解析失败统一返回 400 "参数无效"
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            debug!("读取请求体失败: {}", rejection.body_text());
            invalid_params()
        })?;
        if bytes.len() > MAX_BODY_BYTES {
            return Err(invalid_params().into());
        }
        serde_json::from_slice(&bytes).map(ApiJson).map_err(|e| {
            debug!("请求体解析失败: {}", e);
            invalid_params().into()
        })
    }
}

/// 查询参数，解析失败同样返回 400 "参数无效"
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await.map_err(|rejection| {
            debug!("查询参数解析失败: {}", rejection.body_text());
            invalid_params()
        })?;
        Ok(ApiQuery(value))
    }
}

fn invalid_params() -> InnerApiError {
    InnerApiError::BadRequest("参数无效".to_string())
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ImportSitesRequest {
    #[serde(default)]
    #[schema(value_type = Vec<Site>)]
    pub sites: Value,
}

impl ImportSitesRequest {
    pub fn into_sites(self) -> Result<Vec<Site>, InnerApiError> {
        sites_from_value(&self.sites).ok_or_else(|| InnerApiError::BadRequest("sites 参数无效".to_string()))
    }
}

#[derive(Deserialize, ToSchema)]
pub struct SiteStatusRequest {
    #[serde(default)]
    pub key: String,
    #[serde(default, deserialize_with = "deserialize_loose_bool")]
    pub enabled: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct SiteHomeRequest {
    #[serde(default)]
    pub key: String,
    #[serde(default, deserialize_with = "deserialize_loose_bool")]
    pub home: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct SiteSearchRequest {
    #[serde(default)]
    pub key: String,
    #[serde(default, deserialize_with = "deserialize_loose_bool")]
    pub search: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct SiteAvailabilityRequest {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    #[schema(value_type = String)]
    pub availability: Value,
}

impl SiteAvailabilityRequest {
    pub fn availability(&self) -> Availability {
        Availability::normalize(&value_to_string(&self.availability))
    }
}

/// 开关类请求缺少布尔值时视为参数无效
pub fn require_flag(flag: Option<bool>) -> Result<bool, InnerApiError> {
    flag.ok_or_else(invalid_params)
}

#[derive(Deserialize, ToSchema)]
pub struct SiteOrderRequest {
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub order: Value,
}

impl SiteOrderRequest {
    pub fn into_order(self) -> Result<Vec<String>, InnerApiError> {
        string_array_from_value(&self.order).ok_or_else(|| InnerApiError::BadRequest("order 参数无效".to_string()))
    }
}

#[derive(Deserialize, ToSchema)]
pub struct SiteCheckRequest {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub results: Option<Map<String, Value>>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub errors: Option<Map<String, Value>>,
}

impl SiteCheckRequest {
    /// 检测结果的取值统一规范化，错误信息只接受标量
    pub fn into_parts(self) -> (BTreeMap<String, Availability>, Option<BTreeMap<String, String>>) {
        let results = self
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key.trim().to_string(), Availability::normalize(&value_to_string(&value))))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        let errors = self.errors.map(|errors| {
            errors
                .into_iter()
                .map(|(key, value)| (key.trim().to_string(), value_to_string(&value)))
                .filter(|(key, _)| !key.is_empty())
                .collect()
        });
        (results, errors)
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchSettingsRequest {
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub order: Value,
    #[serde(default, alias = "cover_site")]
    pub cover_site: String,
}

impl SearchSettingsRequest {
    pub fn order(&self) -> Vec<String> {
        string_array_from_value(&self.order).unwrap_or_default()
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, alias = "cat_api_base")]
    pub cat_api_base: String,
    #[serde(default, alias = "cat_proxy")]
    pub cat_proxy: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UsernameRequest {
    #[serde(default)]
    pub username: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "new_username")]
    pub new_username: Option<String>,
    #[serde(default, alias = "new_password")]
    pub new_password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "cat_api_base")]
    pub cat_api_base: Option<String>,
    #[serde(default, alias = "cat_proxy")]
    pub cat_proxy: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct KeywordRequest {
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub keyword: String,
}

#[derive(Deserialize, IntoParams)]
pub struct KeywordQuery {
    /// 为空时清空全部搜索历史
    pub keyword: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

impl LimitQuery {
    /// 无法解析为正整数时使用默认值
    pub fn limit_or(&self, default: u64) -> u64 {
        self.limit
            .as_deref()
            .and_then(|limit| limit.trim().parse::<u64>().ok())
            .filter(|&limit| limit > 0)
            .unwrap_or(default)
    }
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct VideoQuery {
    #[serde(default)]
    pub site_key: String,
    #[serde(default)]
    pub video_id: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayRecordRequest {
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub site_key: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub site_name: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub spider_api: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub video_id: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub video_title: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub video_poster: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub video_remark: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub pan_label: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub play_flag: String,
    #[serde(default)]
    #[schema(value_type = i32)]
    pub episode_index: Value,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub episode_name: String,
    #[serde(default, deserialize_with = "deserialize_loose_bool")]
    pub force_poster_update: Option<bool>,
}

impl From<PlayRecordRequest> for NewPlayRecord {
    fn from(req: PlayRecordRequest) -> Self {
        let episode_index = int_from_value_floor(&req.episode_index)
            .map(|index| index.clamp(0, i64::from(i32::MAX)) as i32)
            .unwrap_or(0);
        Self {
            site_key: req.site_key,
            site_name: req.site_name,
            spider_api: req.spider_api,
            video_id: req.video_id,
            video_title: req.video_title,
            video_poster: req.video_poster,
            video_remark: req.video_remark,
            pan_label: req.pan_label,
            play_flag: req.play_flag,
            episode_index,
            episode_name: req.episode_name,
            force_poster_update: req.force_poster_update.unwrap_or(false),
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggleRequest {
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub site_key: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub site_name: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub spider_api: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub video_id: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub video_title: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub video_poster: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub video_remark: String,
}

impl From<FavoriteToggleRequest> for NewFavorite {
    fn from(req: FavoriteToggleRequest) -> Self {
        Self {
            site_key: req.site_key,
            site_name: req.site_name,
            spider_api: req.spider_api,
            video_id: req.video_id,
            video_title: req.video_title,
            video_poster: req.video_poster,
            video_remark: req.video_remark,
        }
    }
}

#[derive(Deserialize, IntoParams)]
pub struct BootstrapQuery {
    /// 当前页面：index、douban、play、site 或 dashboard
    #[serde(default)]
    pub page: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettingsRequest {
    #[serde(default, alias = "site_name", deserialize_with = "deserialize_loose_string")]
    pub site_name: String,
    #[serde(default, alias = "douban_data_proxy", deserialize_with = "deserialize_loose_string")]
    pub douban_data_proxy: String,
    #[serde(default, alias = "douban_data_custom", deserialize_with = "deserialize_loose_string")]
    pub douban_data_custom: String,
    #[serde(default, alias = "douban_img_proxy", deserialize_with = "deserialize_loose_string")]
    pub douban_img_proxy: String,
    #[serde(default, alias = "douban_img_custom", deserialize_with = "deserialize_loose_string")]
    pub douban_img_custom: String,
}

impl From<SiteSettingsRequest> for SiteSettingsUpdate {
    fn from(req: SiteSettingsRequest) -> Self {
        Self {
            site_name: req.site_name,
            douban_data_proxy: req.douban_data_proxy,
            douban_data_custom: req.douban_data_custom,
            douban_img_proxy: req.douban_img_proxy,
            douban_img_custom: req.douban_img_custom,
        }
    }
}
