//! 页面初始化接口：登录状态、站点名称与当前页面需要的设置

use std::sync::Arc;

use axum::extract::Extension;
use meowfilm_entity::users::{self, UserRole};

use crate::api::request::{ApiQuery, BootstrapQuery};
use crate::api::response::{BootstrapResponse, LoginResponse, PageSettings};
use crate::api::wrapper::{ApiError, ApiResponse};
use crate::auth::MaybeUser;
use crate::settings::{keys, SettingsStore, SiteSettings};
use crate::sites::SiteService;
use crate::users::UserService;

/// 需要豆瓣代理、个人接口与首页站点的前台页面
const FRONT_PAGES: [&str; 4] = ["index", "douban", "play", "site"];
const DASHBOARD_PAGE: &str = "dashboard";

#[utoipa::path(
    get,
    path = "/api/bootstrap",
    params(BootstrapQuery),
    responses(
        (status = 200, body = ApiResponse<BootstrapResponse>),
    ),
    security((), ("Token" = []))
)]
pub async fn bootstrap(
    MaybeUser(user): MaybeUser,
    Extension(settings): Extension<Arc<SettingsStore>>,
    Extension(site_service): Extension<Arc<SiteService>>,
    Extension(user_service): Extension<Arc<UserService>>,
    ApiQuery(query): ApiQuery<BootstrapQuery>,
) -> Result<ApiResponse<BootstrapResponse>, ApiError> {
    let site_name = settings.get(keys::SITE_NAME).await?;
    let Some(user) = user else {
        return Ok(ApiResponse::ok(BootstrapResponse {
            authenticated: false,
            site_name,
            user: None,
            settings: None,
            user_count: None,
        }));
    };

    let page = query.page.trim();
    let page_settings = if FRONT_PAGES.contains(&page) {
        front_page_settings(&user, &settings, &site_service, &user_service).await?
    } else {
        PageSettings::default()
    };
    let user_count = if page == DASHBOARD_PAGE && user.user_role() == UserRole::Admin {
        user_service.count().await?
    } else {
        0
    };
    Ok(ApiResponse::ok(BootstrapResponse {
        authenticated: true,
        site_name,
        user: Some(LoginResponse {
            username: user.username.clone(),
            role: user.role.clone(),
        }),
        settings: Some(page_settings),
        user_count: Some(user_count),
    }))
}

async fn front_page_settings(
    user: &users::Model,
    settings: &SettingsStore,
    site_service: &SiteService,
    user_service: &UserService,
) -> Result<PageSettings, ApiError> {
    let site = SiteSettings::load(settings).await?;
    let personal = user_service.settings(user.id).await?;
    // 普通用户使用个人搜索设置，其余角色使用全局搜索设置
    let (search_site_order, search_cover_site) = if user.user_role() == UserRole::User {
        (personal.search_site_order, personal.search_cover_site)
    } else {
        let (_, search) = site_service.global_search_settings().await?;
        (search.order, search.cover_site)
    };
    Ok(PageSettings {
        douban_data_proxy: Some(site.douban_data_proxy),
        douban_data_custom: Some(site.douban_data_custom),
        douban_img_proxy: Some(site.douban_img_proxy),
        douban_img_custom: Some(site.douban_img_custom),
        user_cat_paw_open_api_base: Some(personal.cat_api_base),
        user_cat_paw_open_api_key: Some(personal.cat_api_key),
        user_cat_paw_open_proxy: Some(personal.cat_proxy),
        search_thread_count: Some(personal.search_thread_count),
        search_site_order: Some(search_site_order),
        search_cover_site: Some(search_cover_site),
        home_sites: Some(site_service.user_home_sites(user.id).await?),
    })
}
