use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::model::{sites_from_json, Availability, Site};
use crate::utils::convert::{
    bool_map_from_json, dedup_strings, parse_json_object, string_array_from_json, to_json_string,
};

/// 站点启用状态，缺省为启用
pub type StatusMap = BTreeMap<String, bool>;
/// 首页展示状态，缺省值由站点本身决定
pub type HomeMap = BTreeMap<String, bool>;
/// 可用性检测结果，缺省为未检测
pub type AvailabilityMap = BTreeMap<String, Availability>;
/// 是否参与搜索（仅全局），缺省为参与
pub type SearchMap = BTreeMap<String, bool>;
/// 最近一次检测的错误信息（仅全局）
pub type ErrorMap = BTreeMap<String, String>;

/// 排序列表中缺席的站点排在最后
const UNORDERED_RANK: usize = 1_000_000_000;

/// 手动排序后的站点 key 序列，不含重复
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteOrder(Vec<String>);

impl SiteOrder {
    /// 去除空白、空串与重复项
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self(dedup_strings(keys))
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }

    pub fn into_keys(self) -> Vec<String> {
        self.0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// key 到排名的查找表
    pub fn ranks(&self) -> HashMap<&str, usize> {
        self.0.iter().enumerate().map(|(i, k)| (k.as_str(), i)).collect()
    }

    /// 按排序列表稳定排序站点：未排序的站点放在最后，同名次按原始位置
    pub fn apply<'a>(&self, sites: &'a [Site]) -> Vec<&'a Site> {
        let ranks = self.ranks();
        let mut decorated: Vec<(usize, usize, &Site)> = sites
            .iter()
            .enumerate()
            .map(|(i, s)| (ranks.get(s.key.as_str()).copied().unwrap_or(UNORDERED_RANK), i, s))
            .collect();
        decorated.sort_by_key(|&(rank, index, _)| (rank, index));
        decorated.into_iter().map(|(_, _, s)| s).collect()
    }

    /// 将提交的顺序限定在 `valid` 内并去重，再按 `valid` 的顺序补齐缺失的 key
    pub fn complete<'a>(submitted: impl IntoIterator<Item = &'a str>, valid: &[&str]) -> Self {
        let allowed: HashSet<&str> = valid.iter().copied().collect();
        let mut seen: HashSet<&str> = HashSet::with_capacity(valid.len());
        let mut out = Vec::with_capacity(valid.len());
        for key in submitted {
            let key = key.trim();
            if !key.is_empty() && allowed.contains(key) && seen.insert(key) {
                out.push(key.to_string());
            }
        }
        for &key in valid {
            if !key.is_empty() && seen.insert(key) {
                out.push(key.to_string());
            }
        }
        Self(out)
    }
}

/// 站点列表之上的用户/管理员自定义层
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteOverlays {
    pub status: StatusMap,
    pub home: HomeMap,
    pub order: SiteOrder,
    pub availability: AvailabilityMap,
}

/// 一个作用域（全局或单个用户）下完整的站点状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteState {
    pub sites: Vec<Site>,
    pub overlays: SiteOverlays,
}

impl SiteState {
    pub fn contains_key(&self, key: &str) -> bool {
        self.sites.iter().any(|s| s.key == key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.sites.iter().map(|s| s.key.as_str()).collect()
    }
}

/// 站点状态的持久化形式，五个字段均为 JSON 文本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteColumns {
    pub sites: String,
    pub status: String,
    pub home: String,
    pub order: String,
    pub availability: String,
}

impl SiteColumns {
    pub fn from_state(state: &SiteState) -> Self {
        Self {
            sites: to_json_string(&state.sites),
            status: to_json_string(&state.overlays.status),
            home: to_json_string(&state.overlays.home),
            order: to_json_string(&state.overlays.order),
            availability: to_json_string(&state.overlays.availability),
        }
    }

    /// 宽松解析，损坏的字段按空处理
    pub fn parse(&self) -> SiteState {
        SiteState {
            sites: sites_from_json(&self.sites),
            overlays: SiteOverlays {
                status: bool_map_from_json(&self.status),
                home: bool_map_from_json(&self.home),
                order: order_from_json(&self.order),
                availability: availability_from_json(&self.availability),
            },
        }
    }
}

pub fn order_from_json(text: &str) -> SiteOrder {
    SiteOrder(string_array_from_json(text))
}

/// 解析可用性映射，非法取值规范化为未检测
pub fn availability_from_json(text: &str) -> AvailabilityMap {
    parse_json_object(text)
        .into_iter()
        .filter_map(|(k, v)| {
            let key = k.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), Availability::normalize(v.as_str().unwrap_or_default())))
        })
        .collect()
}
