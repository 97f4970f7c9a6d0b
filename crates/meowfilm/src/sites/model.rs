use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::utils::convert::{int_from_value_floor, parse_json_array};

/// 站点记录，`key` 为唯一标识
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Site {
    pub key: String,
    pub name: String,
    pub api: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub site_type: Option<i64>,
}

impl Site {
    pub fn new(key: impl Into<String>, name: impl Into<String>, api: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            api: api.into(),
            site_type: None,
        }
    }

    /// 从 api 中提取 `/spider/<name>/` 的爬虫名
    pub fn spider_name(&self) -> Option<&str> {
        const MARKER: &str = "/spider/";
        let api = self.api.trim();
        let rest = &api[api.find(MARKER)? + MARKER.len()..];
        rest.find('/').map(|end| &rest[..end])
    }

    /// 配置中心站点（baseset）不参与搜索
    pub fn is_config_center(&self) -> bool {
        let api = self.api.trim();
        api.contains("/spider/baseset/")
            || api.ends_with("/spider/baseset")
            || self.key.trim().to_lowercase().contains("baseset")
    }

    /// 未设置时是否在首页展示
    pub fn default_home(&self) -> bool {
        self.spider_name() != Some("baseset")
    }

    /// 从宽松的 JSON 对象构造站点，缺少 key 或 api 时返回 `None`
    fn from_json_object(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |field: &str| obj.get(field).and_then(Value::as_str).unwrap_or_default();
        let site_type = obj
            .get("type")
            .filter(|v| !v.is_null())
            .and_then(int_from_value_floor);
        Some(Self {
            key: text("key").to_string(),
            name: text("name").to_string(),
            api: text("api").to_string(),
            site_type,
        })
    }
}

/// 站点可用性
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Availability {
    Valid,
    Invalid,
    Unknown,
    #[default]
    Unchecked,
    CategoryError,
    SearchError,
}

impl Availability {
    /// 不在取值范围内的一律视为未检测
    pub fn normalize(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_default()
    }
}

/// 规范化站点列表：去除 key/api 首尾空白，丢弃空值，按 key 首次出现去重
pub fn normalize_sites(input: impl IntoIterator<Item = Site>) -> Vec<Site> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<Site> = Vec::new();
    for site in input {
        let key = site.key.trim();
        let api = site.api.trim();
        if key.is_empty() || api.is_empty() || seen.contains(key) {
            continue;
        }
        seen.insert(key.to_string());
        out.push(Site {
            key: key.to_string(),
            name: site.name,
            api: api.to_string(),
            site_type: site.site_type,
        });
    }
    out
}

/// 解析请求体中的站点数组，非数组返回 `None`
pub fn sites_from_value(value: &Value) -> Option<Vec<Site>> {
    let list = value.as_array()?;
    Some(normalize_sites(list.iter().filter_map(Site::from_json_object)))
}

/// 解析持久化的站点列表 JSON，格式错误时退化为空列表
pub fn sites_from_json(text: &str) -> Vec<Site> {
    normalize_sites(parse_json_array(text).iter().filter_map(Site::from_json_object))
}
