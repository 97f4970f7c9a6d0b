//! 搜索顺序与封面站点

use super::merge::SiteRow;
use super::overlay::SiteOrder;

/// 个人搜索设置中的封面站点：必须出现在搜索顺序中，否则取顺序中的第一个
pub fn resolve_cover_site(order: &SiteOrder, candidate: &str) -> String {
    let candidate = candidate.trim();
    if !candidate.is_empty() && order.contains(candidate) {
        return candidate.to_string();
    }
    order.keys().first().cloned().unwrap_or_default()
}

/// 全局搜索设置中的封面站点：提交值需为目录中的站点，否则取第一个启用的站点，再否则取顺序中的第一个
pub fn resolve_global_cover_site(rows: &[SiteRow], order: &SiteOrder, candidate: &str) -> String {
    let candidate = candidate.trim();
    if !candidate.is_empty() && rows.iter().any(|r| r.key == candidate) {
        return candidate.to_string();
    }
    rows.iter()
        .find(|r| r.enabled)
        .map(|r| r.key.clone())
        .or_else(|| order.keys().first().cloned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::merge::{merge_for_display, GlobalExtras};
    use crate::sites::model::Site;
    use crate::sites::overlay::SiteOverlays;

    #[test]
    fn test_cover_site_fallback() {
        let order = SiteOrder::from_keys(["b", "a"]);
        assert_eq!(resolve_cover_site(&order, "a"), "a");
        assert_eq!(resolve_cover_site(&order, " a "), "a");
        assert_eq!(resolve_cover_site(&order, "zzz"), "b");
        assert_eq!(resolve_cover_site(&order, ""), "b");
        assert_eq!(resolve_cover_site(&SiteOrder::default(), "a"), "");
    }

    #[test]
    fn test_global_cover_prefers_first_enabled() {
        let sites = vec![Site::new("a", "A", "/a"), Site::new("b", "B", "/b")];
        let mut overlays = SiteOverlays::default();
        overlays.status.insert("a".into(), false);
        let rows = merge_for_display(&sites, &overlays, GlobalExtras::none());
        let order = SiteOrder::from_keys(["a", "b"]);

        assert_eq!(resolve_global_cover_site(&rows, &order, "a"), "a");
        assert_eq!(resolve_global_cover_site(&rows, &order, "missing"), "b");

        overlays.status.insert("b".into(), false);
        let rows = merge_for_display(&sites, &overlays, GlobalExtras::none());
        assert_eq!(resolve_global_cover_site(&rows, &order, ""), "a");
        assert_eq!(resolve_global_cover_site(&[], &SiteOrder::default(), "x"), "");
    }
}
