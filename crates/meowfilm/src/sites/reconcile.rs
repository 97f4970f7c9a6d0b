//! 站点列表刷新时的状态合并。
//!
//! 外部站点列表会被定期重新导入，其中站点可能新增、删除或调整顺序。合并时保留已有站点的
//! 启用、首页、可用性设置与手动排序，丢弃已不存在站点的残留设置，并为新站点补上默认值。

use std::collections::{HashMap, HashSet};

use super::model::{normalize_sites, Availability, Site};
use super::overlay::{AvailabilityMap, HomeMap, SiteOrder, SiteOverlays, SiteState, StatusMap};

/// 以新的站点列表为准，合并上一次的自定义层。
///
/// 纯函数且不会失败：对同一份站点列表重复执行结果不变。
pub fn reconcile(next_sites: impl IntoIterator<Item = Site>, prev: &SiteOverlays) -> SiteState {
    let sites = normalize_sites(next_sites);
    let key_set: HashSet<String> = sites.iter().map(|s| s.key.clone()).collect();
    let is_current = |key: &str| key_set.contains(key);

    let mut status: StatusMap = prev
        .status
        .iter()
        .filter(|(k, _)| is_current(k.trim()))
        .map(|(k, v)| (k.trim().to_string(), *v))
        .collect();
    let mut home: HomeMap = prev
        .home
        .iter()
        .filter(|(k, _)| is_current(k.trim()))
        .map(|(k, v)| (k.trim().to_string(), *v))
        .collect();
    let mut availability: AvailabilityMap = prev
        .availability
        .iter()
        .filter(|(k, _)| is_current(k.trim()))
        .map(|(k, v)| (k.trim().to_string(), *v))
        .collect();

    for site in &sites {
        status.entry(site.key.clone()).or_insert(true);
        home.entry(site.key.clone()).or_insert_with(|| site.default_home());
        availability.entry(site.key.clone()).or_insert(Availability::Unchecked);
    }

    // 已有站点保持原有位置，新站点依次排在新列表中前一个已排序站点之后
    let kept = SiteOrder::from_keys(prev.order.keys().iter().map(String::as_str).filter(|k| is_current(k.trim())));
    let kept_keys: HashSet<&str> = kept.keys().iter().map(String::as_str).collect();
    let mut leading: Vec<&str> = Vec::new();
    let mut followers: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut anchor: Option<&str> = None;
    for site in &sites {
        let key = site.key.as_str();
        if kept_keys.contains(key) {
            anchor = Some(key);
            continue;
        }
        match anchor {
            Some(anchor) => followers.entry(anchor).or_default().push(key),
            None => leading.push(key),
        }
    }
    let mut merged = leading;
    for key in kept.keys() {
        merged.push(key.as_str());
        if let Some(after) = followers.remove(key.as_str()) {
            merged.extend(after);
        }
    }
    let order = SiteOrder::from_keys(merged);

    SiteState {
        sites,
        overlays: SiteOverlays {
            status,
            home,
            order,
            availability,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::overlay::SiteColumns;

    fn site(key: &str, api: &str) -> Site {
        Site::new(key, key.to_uppercase(), api)
    }

    fn abc() -> Vec<Site> {
        vec![site("a", "/spider/a/1"), site("b", "/spider/b/1"), site("c", "/spider/c/1")]
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut prev = SiteOverlays::default();
        prev.status.insert("b".into(), false);
        prev.order = SiteOrder::from_keys(["c", "a"]);

        let once = reconcile(abc(), &prev);
        let twice = reconcile(once.sites.clone(), &once.overlays);
        assert_eq!(once, twice);
        assert_eq!(SiteColumns::from_state(&once), SiteColumns::from_state(&twice));
    }

    #[test]
    fn test_reconcile_key_sets_match_sites() {
        let mut prev = SiteOverlays::default();
        prev.home.insert("z".into(), true);
        prev.order = SiteOrder::from_keys(["z", "b"]);

        let state = reconcile(abc(), &prev);
        let keys: Vec<&str> = state.keys();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(state.overlays.status.keys().map(String::as_str).collect::<Vec<_>>(), sorted);
        assert_eq!(state.overlays.home.keys().map(String::as_str).collect::<Vec<_>>(), sorted);
        assert_eq!(state.overlays.availability.keys().map(String::as_str).collect::<Vec<_>>(), sorted);
        let mut order: Vec<&str> = state.overlays.order.keys().iter().map(String::as_str).collect();
        order.sort();
        assert_eq!(order, sorted);
    }

    #[test]
    fn test_reconcile_preserves_customization() {
        let mut prev = SiteOverlays::default();
        prev.status.insert("a".into(), false);
        prev.home.insert("b".into(), false);
        prev.availability.insert("c".into(), Availability::Invalid);

        let state = reconcile(abc(), &prev);
        assert!(!state.overlays.status["a"]);
        assert!(!state.overlays.home["b"]);
        assert_eq!(state.overlays.availability["c"], Availability::Invalid);
        assert!(state.overlays.status["b"]);
        assert!(state.overlays.home["a"]);
        assert_eq!(state.overlays.availability["a"], Availability::Unchecked);
    }

    #[test]
    fn test_reconcile_prunes_stale_keys() {
        let mut prev = SiteOverlays::default();
        prev.status.insert("z".into(), false);
        prev.home.insert("z".into(), false);
        prev.availability.insert("z".into(), Availability::Valid);
        prev.order = SiteOrder::from_keys(["z", "a"]);

        let state = reconcile(abc(), &prev);
        assert!(!state.overlays.status.contains_key("z"));
        assert!(!state.overlays.home.contains_key("z"));
        assert!(!state.overlays.availability.contains_key("z"));
        assert!(!state.overlays.order.contains("z"));
    }

    #[test]
    fn test_reconcile_inserts_new_key_after_neighbor() {
        let prev = SiteOverlays {
            order: SiteOrder::from_keys(["a", "c"]),
            ..Default::default()
        };
        let state = reconcile(abc(), &prev);
        assert_eq!(state.overlays.order.keys(), ["a", "b", "c"]);
    }

    #[test]
    fn test_reconcile_keeps_manual_order_and_inserts_at_front() {
        // 手动调整为 c, a；新站点 x 位于新列表最前，插入到开头；b 跟在 a 之后
        let prev = SiteOverlays {
            order: SiteOrder::from_keys(["c", "a"]),
            ..Default::default()
        };
        let mut next = vec![site("x", "/spider/x/1")];
        next.extend(abc());
        let state = reconcile(next, &prev);
        assert_eq!(state.overlays.order.keys(), ["x", "c", "a", "b"]);
    }

    #[test]
    fn test_reconcile_new_keys_follow_their_own_neighbor() {
        // 两段新站点分别跟在各自的前一个站点之后
        let prev = SiteOverlays {
            order: SiteOrder::from_keys(["a", "b"]),
            ..Default::default()
        };
        let next = vec![
            site("b", "/spider/b/1"),
            site("n1", "/spider/n1/1"),
            site("n2", "/spider/n2/1"),
            site("a", "/spider/a/1"),
            site("n3", "/spider/n3/1"),
        ];
        let state = reconcile(next, &prev);
        assert_eq!(state.overlays.order.keys(), ["a", "n3", "b", "n1", "n2"]);
    }

    #[test]
    fn test_reconcile_large_catalog() {
        let sites: Vec<Site> = (0..20_000).map(|i| site(&format!("k{}", i), "/spider/k/1")).collect();
        // 奇数站点已手动倒序排列，偶数站点是新增的
        let odd: Vec<String> = (0..20_000).rev().step_by(2).map(|i| format!("k{}", i)).collect();
        let prev = SiteOverlays {
            order: SiteOrder::from_keys(odd.iter().map(String::as_str)),
            ..Default::default()
        };
        let state = reconcile(sites, &prev);
        let order = state.overlays.order.keys();
        assert_eq!(order.len(), 20_000);
        assert_eq!(order[..4], ["k0", "k19999", "k19997", "k19998"]);
        assert_eq!(order[19_999], "k2");
    }

    #[test]
    fn test_reconcile_empty_previous_order_follows_source() {
        let state = reconcile(abc(), &SiteOverlays::default());
        assert_eq!(state.overlays.order.keys(), ["a", "b", "c"]);
    }

    #[test]
    fn test_reconcile_defaults_config_center_home_off() {
        let sites = vec![site("a", "/spider/a/"), site("cfg", "/spider/baseset/")];
        let state = reconcile(sites, &SiteOverlays::default());
        assert!(state.overlays.home["a"]);
        assert!(!state.overlays.home["cfg"]);
        assert!(state.overlays.status["cfg"]);
    }

    #[test]
    fn test_reconcile_normalizes_input() {
        let sites = vec![
            Site::new(" a ", "A", " /spider/a/1 "),
            Site::new("a", "重复", "/spider/a/2"),
            Site::new("", "空", "/spider/e/1"),
        ];
        let state = reconcile(sites, &SiteOverlays::default());
        assert_eq!(state.sites, vec![Site::new("a", "A", "/spider/a/1")]);
    }
}
