use serde::Serialize;
use utoipa::ToSchema;

use crate::settings::SiteSettings;
use crate::sites::{HomeSiteRow, SearchSettings, SiteRow};
use crate::users::{DeletedRows, SitesSync, UpdatedUser, UserSettings, UserSummary};

/// 只表示成功、不携带数据的响应
#[derive(Serialize, ToSchema)]
pub struct EmptyResponse {}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub username: String,
    pub role: String,
}

#[derive(Serialize, ToSchema)]
pub struct SitesResponse {
    pub sites: Vec<SiteRow>,
}

#[derive(Serialize, ToSchema)]
pub struct HomeSitesResponse {
    pub sites: Vec<HomeSiteRow>,
}

#[derive(Serialize, ToSchema)]
pub struct SiteOrderResponse {
    pub order: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SearchSettingsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sites: Option<Vec<SiteRow>>,
    pub search: SearchSettings,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSettingsResponse {
    pub settings: UserSettings,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveUserSettingsResponse {
    pub settings: UserSettings,
    pub sites_sync: SitesSync,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<UserSummary>,
    pub user_count: usize,
}

#[derive(Serialize, ToSchema)]
pub struct UserStatusResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteUserResponse {
    pub deleted: DeletedRows,
}

#[derive(Serialize, ToSchema)]
pub struct UpdateUserResponse {
    pub user: UpdatedUser,
}

#[derive(Serialize, ToSchema)]
pub struct FavoriteStatusResponse {
    pub favorited: bool,
}

#[derive(Serialize, ToSchema)]
pub struct FavoriteToggleResponse {
    pub favorited: bool,
}

#[derive(Serialize, ToSchema)]
pub struct SiteSettingsResponse {
    pub settings: SiteSettings,
}

/// 页面初始化数据，未登录时只有站点名称
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapResponse {
    pub authenticated: bool,
    pub site_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<LoginResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<PageSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_count: Option<u64>,
}

/// 前台页面需要的设置，后台页面为空对象
#[derive(Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub douban_data_proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub douban_data_custom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub douban_img_proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub douban_img_custom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_cat_paw_open_api_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_cat_paw_open_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_cat_paw_open_proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_thread_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_site_order: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_cover_site: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_sites: Option<Vec<HomeSiteRow>>,
}
