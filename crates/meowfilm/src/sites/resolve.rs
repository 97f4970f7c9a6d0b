use meowfilm_entity::users::{self, UserRole};

use super::model::Site;
use super::overlay::{SiteColumns, SiteState};
use super::reconcile::reconcile;
use super::repository::{store_user_site_columns, user_site_columns};

/// 某个用户当前生效的站点视图
#[derive(Debug, Clone, PartialEq)]
pub struct UserSiteView {
    pub state: SiteState,
    pub has_personal_provider: bool,
    pub can_fallback_to_global: bool,
}

impl UserSiteView {
    /// 普通用户未设置 CatPawOpen 时没有任何站点可用
    pub fn requires_provider(&self) -> bool {
        !self.has_personal_provider && !self.can_fallback_to_global
    }

    /// 把视图写回用户行。
    ///
    /// 使用私有站点时写回全部五个字段；回退到全局目录时只写回个人的开关与排序，私有站点列表保持不变。
    pub fn store(&self, model: &mut users::Model) {
        if self.requires_provider() {
            return;
        }
        store_user_site_columns(model, SiteColumns::from_state(&self.state), self.has_personal_provider);
    }
}

pub fn has_personal_provider(model: &users::Model) -> bool {
    !model.cat_api_base.trim().is_empty()
}

pub fn can_fallback_to_global(role: UserRole) -> bool {
    role != UserRole::User
}

/// 计算用户的站点视图，个人的各层状态始终来自用户行
pub fn resolve_user_sites(model: &users::Model, global_sites: &[Site]) -> UserSiteView {
    let has_personal_provider = has_personal_provider(model);
    let can_fallback_to_global = can_fallback_to_global(model.user_role());
    let private = user_site_columns(model).parse();

    let state = if has_personal_provider {
        reconcile(private.sites, &private.overlays)
    } else if can_fallback_to_global {
        reconcile(global_sites.iter().cloned(), &private.overlays)
    } else {
        SiteState {
            sites: Vec::new(),
            overlays: private.overlays,
        }
    };

    UserSiteView {
        state,
        has_personal_provider,
        can_fallback_to_global,
    }
}

/// 将新的站点列表合并进用户的私有作用域，返回合并结果以及持久化内容是否变化
pub fn import_private_sites(model: &mut users::Model, sites: Vec<Site>) -> (SiteState, bool) {
    let previous = user_site_columns(model);
    let next = reconcile(sites, &previous.parse().overlays);
    let columns = SiteColumns::from_state(&next);
    let refreshed = columns != previous;
    store_user_site_columns(model, columns, true);
    (next, refreshed)
}

/// 个人搜索设置可选的站点 key：有私有站点用私有的，否则可回退时用全局的，再否则仍用私有的
pub fn available_search_keys(model: &users::Model, global_sites: &[Site]) -> Vec<String> {
    let sites = if has_personal_provider(model) || !can_fallback_to_global(model.user_role()) {
        super::model::sites_from_json(&model.cat_sites)
    } else {
        global_sites.to_vec()
    };
    sites.into_iter().map(|s| s.key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::model::Availability;

    fn user(role: UserRole, api_base: &str) -> users::Model {
        users::Model {
            id: 1,
            username: "u".into(),
            password: String::new(),
            role: role.to_string(),
            status: "active".into(),
            cat_api_base: api_base.into(),
            cat_api_key: String::new(),
            cat_proxy: String::new(),
            search_thread_count: 5,
            cat_sites: "[]".into(),
            cat_site_status: "{}".into(),
            cat_site_home: "{}".into(),
            cat_site_order: "[]".into(),
            cat_site_availability: "{}".into(),
            cat_search_order: "[]".into(),
            cat_search_cover_site: String::new(),
            revision: 0,
        }
    }

    fn global() -> Vec<Site> {
        vec![Site::new("g1", "G1", "/spider/g1/"), Site::new("g2", "G2", "/spider/g2/")]
    }

    #[test]
    fn test_personal_provider_uses_private_sites() {
        let mut model = user(UserRole::User, "http://cat/");
        model.cat_sites = r#"[{"key":"p","name":"P","api":"/spider/p/"}]"#.into();
        model.cat_site_status = r#"{"p":false,"stale":true}"#.into();

        let view = resolve_user_sites(&model, &global());
        assert!(view.has_personal_provider);
        assert!(!view.requires_provider());
        assert_eq!(view.state.keys(), vec!["p"]);
        assert_eq!(view.state.overlays.status.get("p"), Some(&false));
        assert!(!view.state.overlays.status.contains_key("stale"));

        let mut next = model.clone();
        view.store(&mut next);
        assert_eq!(next.cat_site_status, r#"{"p":false}"#);
    }

    #[test]
    fn test_elevated_role_falls_back_to_global() {
        let mut model = user(UserRole::Shared, "  ");
        model.cat_site_status = r#"{"g2":false}"#.into();
        model.cat_site_order = r#"["g2"]"#.into();

        let view = resolve_user_sites(&model, &global());
        assert!(!view.has_personal_provider);
        assert!(view.can_fallback_to_global);
        assert_eq!(view.state.keys(), vec!["g1", "g2"]);
        // 个人的开关与排序保留
        assert_eq!(view.state.overlays.status.get("g2"), Some(&false));
        assert_eq!(view.state.overlays.order.keys(), ["g1", "g2"]);

        let mut next = model.clone();
        view.store(&mut next);
        // 私有站点列表不被全局目录覆盖
        assert_eq!(next.cat_sites, "[]");
        assert_eq!(next.cat_site_order, r#"["g1","g2"]"#);
        assert_eq!(next.cat_site_availability, r#"{"g1":"unchecked","g2":"unchecked"}"#);
    }

    #[test]
    fn test_plain_user_without_provider_has_no_sites() {
        let mut model = user(UserRole::User, "");
        model.cat_site_status = r#"{"x":false}"#.into();
        let view = resolve_user_sites(&model, &global());
        assert!(view.requires_provider());
        assert!(view.state.sites.is_empty());

        let mut next = model.clone();
        view.store(&mut next);
        assert_eq!(next, model);
    }

    #[test]
    fn test_import_private_sites_reports_refresh() {
        let mut model = user(UserRole::User, "http://cat/");
        model.cat_site_availability = r#"{"a":"valid"}"#.into();
        let sites = vec![Site::new("a", "A", "/spider/a/"), Site::new("b", "B", "/spider/baseset/")];

        let (state, refreshed) = import_private_sites(&mut model, sites.clone());
        assert!(refreshed);
        assert_eq!(state.overlays.availability.get("a"), Some(&Availability::Valid));
        assert_eq!(state.overlays.home.get("b"), Some(&false));

        // 同样的列表再导入一次不产生变化
        let (_, refreshed) = import_private_sites(&mut model, sites);
        assert!(!refreshed);
    }

    #[test]
    fn test_available_search_keys() {
        let mut model = user(UserRole::Admin, "");
        model.cat_sites = r#"[{"key":"p","name":"P","api":"/x"}]"#.into();
        assert_eq!(available_search_keys(&model, &global()), vec!["g1", "g2"]);

        model.cat_api_base = "http://cat/".into();
        assert_eq!(available_search_keys(&model, &global()), vec!["p"]);

        let mut plain = model.clone();
        plain.role = "user".into();
        plain.cat_api_base = String::new();
        assert_eq!(available_search_keys(&plain, &global()), vec!["p"]);
    }
}
