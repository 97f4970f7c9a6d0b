use serde::Serialize;
use utoipa::ToSchema;

use super::model::{Availability, Site};
use super::overlay::{ErrorMap, SearchMap, SiteOverlays};

/// 对外展示的站点行
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SiteRow {
    pub key: String,
    pub name: String,
    pub api: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub site_type: Option<i64>,
    pub enabled: bool,
    pub home: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<bool>,
    pub availability: Availability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 首页站点
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HomeSiteRow {
    pub key: String,
    pub name: String,
    pub api: String,
}

/// 只有全局站点目录才附带搜索开关与错误信息
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalExtras<'a> {
    pub search: Option<&'a SearchMap>,
    pub errors: Option<&'a ErrorMap>,
}

impl<'a> GlobalExtras<'a> {
    pub fn new(search: &'a SearchMap, errors: &'a ErrorMap) -> Self {
        Self {
            search: Some(search),
            errors: Some(errors),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

/// 是否参与搜索：缺省参与，配置中心站点一律不参与
pub fn search_enabled(site: &Site, search: &SearchMap) -> bool {
    !site.is_config_center() && search.get(&site.key).copied().unwrap_or(true)
}

/// 按排序合并站点与各层状态，得到展示用的站点行
pub fn merge_for_display(sites: &[Site], overlays: &SiteOverlays, extras: GlobalExtras<'_>) -> Vec<SiteRow> {
    overlays
        .order
        .apply(sites)
        .into_iter()
        .map(|site| SiteRow {
            key: site.key.clone(),
            name: site.name.clone(),
            api: site.api.clone(),
            site_type: site.site_type,
            enabled: overlays.status.get(&site.key).copied().unwrap_or(true),
            home: overlays
                .home
                .get(&site.key)
                .copied()
                .unwrap_or_else(|| site.default_home()),
            search: extras.search.map(|search| search_enabled(site, search)),
            availability: overlays.availability.get(&site.key).copied().unwrap_or_default(),
            error: extras
                .errors
                .and_then(|errors| errors.get(&site.key))
                .map(|e| e.trim())
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        })
        .collect()
}

/// 首页只展示同时启用且开启首页展示的站点
pub fn home_rows(sites: &[Site], overlays: &SiteOverlays) -> Vec<HomeSiteRow> {
    merge_for_display(sites, overlays, GlobalExtras::none())
        .into_iter()
        .filter(|row| row.enabled && row.home)
        .map(|row| HomeSiteRow {
            key: row.key,
            name: row.name,
            api: row.api,
        })
        .collect()
}
