//! 用户个人设置：CatPawOpen 接口、代理、搜索线程数与个人搜索顺序

use meowfilm_entity::users::{self, UserRole};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::error::UserError;
use crate::sites::{available_search_keys, import_private_sites, resolve_cover_site, sites_from_value, Site, SiteOrder};
use crate::utils::api_base::normalize_api_base;
use crate::utils::convert::{int_from_value_floor, string_array_from_json, string_array_from_value, to_json_string, value_to_string};

const DEFAULT_THREAD_COUNT: i32 = 5;
const MAX_THREAD_COUNT: i64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub cat_api_base: String,
    pub cat_api_key: String,
    pub cat_proxy: String,
    pub search_thread_count: i32,
    pub search_site_order: Vec<String>,
    pub search_cover_site: String,
}

impl UserSettings {
    pub fn from_model(model: &users::Model) -> Self {
        Self {
            cat_api_base: model.cat_api_base.clone(),
            cat_api_key: model.cat_api_key.clone(),
            cat_proxy: model.cat_proxy.clone(),
            search_thread_count: if model.search_thread_count < 1 {
                DEFAULT_THREAD_COUNT
            } else {
                model.search_thread_count
            },
            search_site_order: string_array_from_json(&model.cat_search_order),
            search_cover_site: model.cat_search_cover_site.trim().to_string(),
        }
    }
}

/// 随设置一起提交的站点列表的同步结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SitesSync {
    pub ok: bool,
    pub refreshed: bool,
    pub count: usize,
}

/// 一次设置提交，缺省的字段保持原值
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub cat_api_base: Option<String>,
    pub cat_api_key: Option<String>,
    pub cat_proxy: Option<String>,
    pub search_thread_count: Option<Value>,
    pub search_site_order: Option<Vec<String>>,
    pub search_cover_site: Option<String>,
    pub sites: Option<Vec<Site>>,
}

/// 同时接受驼峰与下划线两种写法，`null` 视为未提交
fn field<'a>(body: &'a Map<String, Value>, camel: &str, snake: &str) -> Option<&'a Value> {
    body.get(camel)
        .or_else(|| body.get(snake))
        .filter(|value| !value.is_null())
}

fn string_field(body: &Map<String, Value>, camel: &str, snake: &str) -> Option<String> {
    body.get(camel)
        .and_then(Value::as_str)
        .or_else(|| body.get(snake).and_then(Value::as_str))
        .map(str::to_string)
}

impl SettingsUpdate {
    pub fn from_json(body: &Map<String, Value>) -> Self {
        Self {
            cat_api_base: string_field(body, "catApiBase", "cat_api_base"),
            cat_api_key: string_field(body, "catApiKey", "cat_api_key"),
            cat_proxy: string_field(body, "catProxy", "cat_proxy"),
            search_thread_count: field(body, "searchThreadCount", "search_thread_count").cloned(),
            search_site_order: field(body, "searchSiteOrder", "search_site_order")
                .map(|v| string_array_from_value(v).unwrap_or_default()),
            search_cover_site: field(body, "searchCoverSite", "search_cover_site").map(value_to_string),
            sites: body.get("sites").and_then(sites_from_value),
        }
    }
}

/// 校验并把设置写入用户行。
///
/// 设置了 CatPawOpen 且提交了站点列表时，站点列表会合并进用户的私有作用域。
pub fn apply_settings(
    model: &mut users::Model,
    update: SettingsUpdate,
    global_sites: &[Site],
) -> Result<SitesSync, UserError> {
    let previous = model.clone();

    let raw_base = update.cat_api_base.unwrap_or_else(|| previous.cat_api_base.clone());
    let api_base = if raw_base.trim().is_empty() {
        String::new()
    } else {
        normalize_api_base(&raw_base).ok_or(UserError::InvalidApiBase)?
    };
    if previous.user_role() == UserRole::User && api_base.is_empty() {
        return Err(UserError::ApiBaseRequired);
    }

    let thread_count = match &update.search_thread_count {
        None => i64::from(previous.search_thread_count),
        Some(value) => int_from_value_floor(value).unwrap_or(-1),
    };
    if !(1..=MAX_THREAD_COUNT).contains(&thread_count) {
        return Err(UserError::InvalidThreadCount);
    }

    let mut sites_sync = SitesSync {
        ok: true,
        ..Default::default()
    };
    let mut available: Vec<String> = Vec::new();
    if let (false, Some(sites)) = (api_base.is_empty(), update.sites) {
        let (state, refreshed) = import_private_sites(model, sites);
        sites_sync.refreshed = refreshed;
        sites_sync.count = state.sites.len();
        available = state.sites.into_iter().map(|s| s.key).collect();
    }
    if available.is_empty() {
        available = available_search_keys(&previous, global_sites);
    }

    let order_input = update
        .search_site_order
        .unwrap_or_else(|| string_array_from_json(&previous.cat_search_order));
    let valid: Vec<&str> = available.iter().map(String::as_str).collect();
    let order = SiteOrder::complete(order_input.iter().map(String::as_str), &valid);
    let cover_candidate = update
        .search_cover_site
        .unwrap_or_else(|| previous.cat_search_cover_site.clone());
    let cover = resolve_cover_site(&order, &cover_candidate);

    model.cat_api_base = api_base;
    model.cat_api_key = update.cat_api_key.unwrap_or(previous.cat_api_key);
    model.cat_proxy = update.cat_proxy.unwrap_or(previous.cat_proxy);
    model.search_thread_count = thread_count as i32;
    model.cat_search_order = to_json_string(&order);
    model.cat_search_cover_site = cover;
    Ok(sites_sync)
}
