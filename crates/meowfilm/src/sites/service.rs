use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use super::error::SiteError;
use super::merge::{home_rows, merge_for_display, GlobalExtras, HomeSiteRow, SiteRow};
use super::model::{normalize_sites, Availability, Site};
use super::overlay::{SiteOrder, SiteState};
use super::reconcile::reconcile;
use super::repository::{GlobalSiteRepository, GlobalSiteSnapshot, UserSiteRepository};
use super::resolve::{can_fallback_to_global, has_personal_provider, import_private_sites, resolve_user_sites, UserSiteView};
use super::search::resolve_global_cover_site;
use crate::settings::SettingsStore;

/// 导入站点列表的结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportOutcome {
    pub refreshed: bool,
    pub count: usize,
    pub sites: Vec<SiteRow>,
}

/// 可用性检测写入的结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckOutcome {
    pub results: BTreeMap<String, Availability>,
    pub sites: Vec<SiteRow>,
}

/// 用户视角下的站点列表
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSites {
    pub sites: Vec<SiteRow>,
    pub requires_cat_api_base: bool,
}

/// 搜索顺序与封面站点
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchSettings {
    pub order: Vec<String>,
    pub cover_site: String,
}

/// 站点目录的全部读写操作，全局与用户两个作用域
#[derive(Clone)]
pub struct SiteService {
    global: GlobalSiteRepository,
    users: UserSiteRepository,
}

fn require_key(key: &str) -> Result<String, SiteError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(SiteError::invalid("参数无效"));
    }
    Ok(key.to_string())
}

fn ensure_site(state: &SiteState, key: &str) -> Result<(), SiteError> {
    if state.contains_key(key) {
        Ok(())
    } else {
        Err(SiteError::UnknownSite(key.to_string()))
    }
}

fn global_rows(snapshot: &GlobalSiteSnapshot) -> Vec<SiteRow> {
    merge_for_display(
        &snapshot.state.sites,
        &snapshot.state.overlays,
        GlobalExtras::new(&snapshot.search, &snapshot.errors),
    )
}

/// 搜索顺序限定在当前目录内，并按展示顺序补齐
fn complete_search_settings(rows: &[SiteRow], order: &[String], cover: &str) -> SearchSettings {
    let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
    let order = SiteOrder::complete(order.iter().map(String::as_str), &keys);
    let cover_site = resolve_global_cover_site(rows, &order, cover);
    SearchSettings {
        order: order.into_keys(),
        cover_site,
    }
}

impl SiteService {
    pub fn new(db: Arc<DatabaseConnection>, settings: Arc<SettingsStore>) -> Self {
        Self {
            global: GlobalSiteRepository::new(settings),
            users: UserSiteRepository::new(db),
        }
    }

    pub fn users(&self) -> &UserSiteRepository {
        &self.users
    }

    pub fn global(&self) -> &GlobalSiteRepository {
        &self.global
    }

    /// 全局目录，不带搜索开关与错误信息
    pub async fn global_sites(&self) -> Result<Vec<SiteRow>> {
        let snapshot = self.global.snapshot().await?;
        Ok(merge_for_display(
            &snapshot.state.sites,
            &snapshot.state.overlays,
            GlobalExtras::none(),
        ))
    }

    /// 管理后台使用的全局目录
    pub async fn dashboard_sites(&self) -> Result<Vec<SiteRow>> {
        Ok(global_rows(&self.global.snapshot().await?))
    }

    pub async fn import_global(&self, sites: Vec<Site>) -> Result<ImportOutcome> {
        let sites = normalize_sites(sites);
        if sites.is_empty() {
            return Err(SiteError::invalid("sites 参数无效").into());
        }
        let (mut outcome, refreshed) = self
            .global
            .replace_sites(|snapshot| {
                snapshot.state = reconcile(sites, &snapshot.state.overlays);
                Ok(ImportOutcome {
                    refreshed: false,
                    count: snapshot.state.sites.len(),
                    sites: global_rows(snapshot),
                })
            })
            .await?;
        outcome.refreshed = refreshed;
        info!("导入全局站点 {} 个，是否刷新: {}", outcome.count, outcome.refreshed);
        Ok(outcome)
    }

    pub async fn set_global_status(&self, key: &str, enabled: bool) -> Result<()> {
        let key = require_key(key)?;
        self.global
            .modify(|snapshot| {
                ensure_site(&snapshot.state, &key)?;
                snapshot.state.overlays.status.insert(key, enabled);
                Ok(())
            })
            .await
    }

    pub async fn set_global_home(&self, key: &str, home: bool) -> Result<()> {
        let key = require_key(key)?;
        self.global
            .modify(|snapshot| {
                ensure_site(&snapshot.state, &key)?;
                snapshot.state.overlays.home.insert(key, home);
                Ok(())
            })
            .await
    }

    pub async fn set_global_search(&self, key: &str, search: bool) -> Result<()> {
        let key = require_key(key)?;
        self.global
            .modify(|snapshot| {
                ensure_site(&snapshot.state, &key)?;
                snapshot.search.insert(key, search);
                Ok(())
            })
            .await
    }

    /// 保存全局排序，返回补齐后的顺序
    pub async fn set_global_order(&self, order: &[String]) -> Result<Vec<String>> {
        self.global
            .modify(|snapshot| {
                let next = SiteOrder::complete(order.iter().map(String::as_str), &snapshot.state.keys());
                snapshot.state.overlays.order = next.clone();
                Ok(next.into_keys())
            })
            .await
    }

    /// 写入可用性检测结果，检测为不可用的站点同时被禁用
    pub async fn check_global(
        &self,
        results: BTreeMap<String, Availability>,
        errors: Option<BTreeMap<String, String>>,
    ) -> Result<CheckOutcome> {
        let outcome = self
            .global
            .modify(|snapshot| {
                let results: BTreeMap<String, Availability> = results
                    .into_iter()
                    .filter(|(key, _)| snapshot.state.contains_key(key))
                    .collect();
                if results.is_empty() {
                    return Err(SiteError::invalid("results 参数无效").into());
                }
                for (key, availability) in &results {
                    snapshot.state.overlays.availability.insert(key.clone(), *availability);
                    if *availability == Availability::Invalid {
                        snapshot.state.overlays.status.insert(key.clone(), false);
                    }
                }
                for (key, message) in errors.into_iter().flatten() {
                    if !snapshot.state.contains_key(&key) {
                        continue;
                    }
                    let message = message.trim();
                    if message.is_empty() {
                        snapshot.errors.remove(&key);
                    } else {
                        snapshot.errors.insert(key, message.to_string());
                    }
                }
                Ok(CheckOutcome {
                    results,
                    sites: global_rows(snapshot),
                })
            })
            .await?;
        info!("写入 {} 个站点的可用性检测结果", outcome.results.len());
        Ok(outcome)
    }

    pub async fn global_search_settings(&self) -> Result<(Vec<SiteRow>, SearchSettings)> {
        let snapshot = self.global.snapshot().await?;
        let rows = global_rows(&snapshot);
        let settings = complete_search_settings(&rows, snapshot.search_order.keys(), &snapshot.search_cover_site);
        Ok((rows, settings))
    }

    pub async fn save_global_search_settings(&self, order: &[String], cover_site: &str) -> Result<SearchSettings> {
        self.global
            .modify(|snapshot| {
                let rows = global_rows(snapshot);
                let settings = complete_search_settings(&rows, order, cover_site);
                snapshot.search_order = SiteOrder::from_keys(settings.order.iter().map(String::as_str));
                snapshot.search_cover_site = settings.cover_site.clone();
                Ok(settings)
            })
            .await
    }

    /// 计算用户的站点视图，合并结果与已保存的内容不一致时顺带写回
    pub async fn resolve_user(&self, user_id: i32) -> Result<UserSiteView> {
        let global_sites = self.global.sites().await?;
        let model = self.users.find(user_id).await?;
        let view = resolve_user_sites(&model, &global_sites);

        let mut next = model.clone();
        view.store(&mut next);
        if next == model {
            return Ok(view);
        }
        let (view, _) = self
            .users
            .modify(user_id, |model| {
                let view = resolve_user_sites(model, &global_sites);
                view.store(model);
                Ok(view)
            })
            .await?;
        debug!("用户 {} 的站点配置已按最新目录更新", user_id);
        Ok(view)
    }

    pub async fn user_sites(&self, user_id: i32) -> Result<UserSites> {
        let view = self.resolve_user(user_id).await?;
        let snapshot = self.global.snapshot().await?;
        Ok(UserSites {
            sites: merge_for_display(
                &view.state.sites,
                &view.state.overlays,
                GlobalExtras::new(&snapshot.search, &snapshot.errors),
            ),
            requires_cat_api_base: view.requires_provider(),
        })
    }

    /// 首页站点：有私有站点用私有的；可回退时直接使用全局首页站点
    pub async fn user_home_sites(&self, user_id: i32) -> Result<Vec<HomeSiteRow>> {
        let model = self.users.find(user_id).await?;
        if !has_personal_provider(&model) {
            if !can_fallback_to_global(model.user_role()) {
                return Ok(Vec::new());
            }
            let snapshot = self.global.snapshot().await?;
            return Ok(home_rows(&snapshot.state.sites, &snapshot.state.overlays));
        }
        let view = self.resolve_user(user_id).await?;
        Ok(home_rows(&view.state.sites, &view.state.overlays))
    }

    /// 在用户的写事务中基于最新视图执行修改
    async fn modify_user_view<T, F>(&self, user_id: i32, f: F) -> Result<T>
    where
        F: FnOnce(&mut SiteState) -> Result<T, SiteError>,
    {
        let global_sites = self.global.sites().await?;
        let (result, _) = self
            .users
            .modify(user_id, |model| {
                let mut view = resolve_user_sites(model, &global_sites);
                let result = f(&mut view.state)?;
                view.store(model);
                Ok(result)
            })
            .await?;
        Ok(result)
    }

    pub async fn set_user_status(&self, user_id: i32, key: &str, enabled: bool) -> Result<()> {
        let key = require_key(key)?;
        self.modify_user_view(user_id, |state| {
            ensure_site(state, &key)?;
            state.overlays.status.insert(key, enabled);
            Ok(())
        })
        .await
    }

    pub async fn set_user_home(&self, user_id: i32, key: &str, home: bool) -> Result<()> {
        let key = require_key(key)?;
        self.modify_user_view(user_id, |state| {
            ensure_site(state, &key)?;
            state.overlays.home.insert(key, home);
            Ok(())
        })
        .await
    }

    pub async fn set_user_availability(&self, user_id: i32, key: &str, availability: Availability) -> Result<()> {
        let key = require_key(key)?;
        self.modify_user_view(user_id, |state| {
            ensure_site(state, &key)?;
            state.overlays.availability.insert(key, availability);
            Ok(())
        })
        .await
    }

    pub async fn set_user_order(&self, user_id: i32, order: &[String]) -> Result<Vec<String>> {
        self.modify_user_view(user_id, |state| {
            let next = SiteOrder::complete(order.iter().map(String::as_str), &state.keys());
            state.overlays.order = next.clone();
            Ok(next.into_keys())
        })
        .await
    }

    /// 把从个人 CatPawOpen 获取的站点列表合并进用户的私有作用域
    pub async fn import_user_sites(&self, user_id: i32, sites: Vec<Site>) -> Result<ImportOutcome> {
        let ((state, refreshed), _) = self
            .users
            .modify(user_id, |model| {
                if !has_personal_provider(model) {
                    return Err(SiteError::ProviderRequired.into());
                }
                Ok(import_private_sites(model, sites))
            })
            .await?;
        let snapshot = self.global.snapshot().await?;
        info!("用户 {} 导入站点 {} 个，是否刷新: {}", user_id, state.sites.len(), refreshed);
        Ok(ImportOutcome {
            refreshed,
            count: state.sites.len(),
            sites: merge_for_display(
                &state.sites,
                &state.overlays,
                GlobalExtras::new(&snapshot.search, &snapshot.errors),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use meowfilm_entity::users::UserRole;

    use super::*;
    use crate::database::setup_memory_database;
    use crate::users::repository::{insert_user, NewUser};

    async fn new_service() -> (SiteService, Arc<DatabaseConnection>) {
        let db = Arc::new(setup_memory_database().await);
        let settings = Arc::new(SettingsStore::new(db.clone()));
        (SiteService::new(db.clone(), settings), db)
    }

    fn catalog() -> Vec<Site> {
        vec![
            Site::new("a", "A", "/spider/a/"),
            Site::new("b", "B", "/spider/baseset/"),
            Site::new("c", "C", "/spider/c/"),
        ]
    }

    fn site_error(err: &anyhow::Error) -> Option<&SiteError> {
        err.downcast_ref::<SiteError>()
    }

    #[tokio::test]
    async fn test_global_import_and_listing() {
        let (service, _) = new_service().await;
        let outcome = service.import_global(catalog()).await.unwrap();
        assert!(outcome.refreshed);
        assert_eq!(outcome.count, 3);

        let b = outcome.sites.iter().find(|r| r.key == "b").unwrap();
        assert!(!b.home);
        assert_eq!(b.search, Some(false));

        // 公共列表不带搜索开关
        let public = service.global_sites().await.unwrap();
        assert!(public.iter().all(|r| r.search.is_none()));

        // 重复导入不刷新
        let outcome = service.import_global(catalog()).await.unwrap();
        assert!(!outcome.refreshed);
    }

    #[tokio::test]
    async fn test_global_import_rejects_empty() {
        let (service, _) = new_service().await;
        let err = service
            .import_global(vec![Site::new(" ", "X", "/x"), Site::new("y", "Y", "")])
            .await
            .unwrap_err();
        assert_matches!(site_error(&err), Some(SiteError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_global_toggles_validate_key() {
        let (service, _) = new_service().await;
        service.import_global(catalog()).await.unwrap();

        service.set_global_status("a", false).await.unwrap();
        service.set_global_home(" c ", false).await.unwrap();
        service.set_global_search("a", false).await.unwrap();
        let err = service.set_global_status("zzz", false).await.unwrap_err();
        assert_matches!(site_error(&err), Some(SiteError::UnknownSite(key)) if key == "zzz");
        let err = service.set_global_home("", true).await.unwrap_err();
        assert_matches!(site_error(&err), Some(SiteError::InvalidInput(_)));

        let rows = service.dashboard_sites().await.unwrap();
        let a = rows.iter().find(|r| r.key == "a").unwrap();
        assert!(!a.enabled);
        assert_eq!(a.search, Some(false));
        assert!(!rows.iter().find(|r| r.key == "c").unwrap().home);
    }

    #[tokio::test]
    async fn test_global_order_is_completed() {
        let (service, _) = new_service().await;
        service.import_global(catalog()).await.unwrap();
        let order = service
            .set_global_order(&["c".into(), "x".into(), "c".into()])
            .await
            .unwrap();
        assert_eq!(order, vec!["c", "a", "b"]);
        let keys: Vec<String> = service.global_sites().await.unwrap().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_global_check_disables_invalid_sites() {
        let (service, _) = new_service().await;
        service.import_global(catalog()).await.unwrap();

        let mut results = BTreeMap::new();
        results.insert("a".to_string(), Availability::Invalid);
        results.insert("c".to_string(), Availability::Valid);
        results.insert("ghost".to_string(), Availability::Valid);
        let mut errors = BTreeMap::new();
        errors.insert("a".to_string(), " 超时 ".to_string());
        let outcome = service.check_global(results, Some(errors)).await.unwrap();
        assert_eq!(outcome.results.len(), 2);

        let a = outcome.sites.iter().find(|r| r.key == "a").unwrap();
        assert!(!a.enabled);
        assert_eq!(a.availability, Availability::Invalid);
        assert_eq!(a.error.as_deref(), Some("超时"));
        let c = outcome.sites.iter().find(|r| r.key == "c").unwrap();
        assert!(c.enabled);
        assert_eq!(c.availability, Availability::Valid);

        // 空错误信息清除记录
        let mut results = BTreeMap::new();
        results.insert("a".to_string(), Availability::Valid);
        let mut errors = BTreeMap::new();
        errors.insert("a".to_string(), String::new());
        let outcome = service.check_global(results, Some(errors)).await.unwrap();
        assert_eq!(outcome.sites.iter().find(|r| r.key == "a").unwrap().error, None);

        let mut only_unknown = BTreeMap::new();
        only_unknown.insert("ghost".to_string(), Availability::Valid);
        let err = service.check_global(only_unknown, None).await.unwrap_err();
        assert_matches!(site_error(&err), Some(SiteError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_global_search_settings() {
        let (service, _) = new_service().await;
        service.import_global(catalog()).await.unwrap();
        service.set_global_status("a", false).await.unwrap();

        let (_, settings) = service.global_search_settings().await.unwrap();
        assert_eq!(settings.order, vec!["a", "b", "c"]);
        // 未设置封面站点时取第一个启用的站点
        assert_eq!(settings.cover_site, "b");

        let saved = service
            .save_global_search_settings(&["c".into(), "nope".into()], "c")
            .await
            .unwrap();
        assert_eq!(saved.order, vec!["c", "a", "b"]);
        assert_eq!(saved.cover_site, "c");
        assert_eq!(service.global_search_settings().await.unwrap().1, saved);

        let saved = service.save_global_search_settings(&[], "nope").await.unwrap();
        assert_eq!(saved.cover_site, "b");
    }

    #[tokio::test]
    async fn test_shared_user_falls_back_and_persists_overlays() {
        let (service, db) = new_service().await;
        service.import_global(catalog()).await.unwrap();
        let user = insert_user(db.as_ref(), NewUser::new("shared", "hash", UserRole::Shared))
            .await
            .unwrap();

        let sites = service.user_sites(user.id).await.unwrap();
        assert!(!sites.requires_cat_api_base);
        assert_eq!(sites.sites.len(), 3);

        // 首次解析时写回个人的开关与排序
        let stored = service.users().find(user.id).await.unwrap();
        assert_eq!(stored.cat_site_order, r#"["a","b","c"]"#);
        assert_eq!(stored.cat_sites, "[]");
        assert_eq!(stored.revision, 1);

        // 再次解析没有变化，不再写入
        service.user_sites(user.id).await.unwrap();
        assert_eq!(service.users().find(user.id).await.unwrap().revision, 1);

        service.set_user_status(user.id, "a", false).await.unwrap();
        let err = service.set_user_home(user.id, "zzz", false).await.unwrap_err();
        assert_matches!(site_error(&err), Some(SiteError::UnknownSite(_)));

        // 个人设置不影响全局
        let global = service.global_sites().await.unwrap();
        assert!(global.iter().all(|r| r.enabled));
        let mine = service.user_sites(user.id).await.unwrap();
        assert!(!mine.sites.iter().find(|r| r.key == "a").unwrap().enabled);

        let home: Vec<String> = service
            .user_home_sites(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(home, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_plain_user_requires_provider() {
        let (service, db) = new_service().await;
        service.import_global(catalog()).await.unwrap();
        let user = insert_user(db.as_ref(), NewUser::new("plain", "hash", UserRole::User))
            .await
            .unwrap();

        let sites = service.user_sites(user.id).await.unwrap();
        assert!(sites.requires_cat_api_base);
        assert!(sites.sites.is_empty());
        assert!(service.user_home_sites(user.id).await.unwrap().is_empty());

        let err = service.import_user_sites(user.id, catalog()).await.unwrap_err();
        assert_matches!(site_error(&err), Some(SiteError::ProviderRequired));
        let err = service.set_user_status(user.id, "a", false).await.unwrap_err();
        assert_matches!(site_error(&err), Some(SiteError::UnknownSite(_)));
    }

    #[tokio::test]
    async fn test_personal_provider_import_and_overlays() {
        let (service, db) = new_service().await;
        service.import_global(catalog()).await.unwrap();
        let mut new_user = NewUser::new("owner", "hash", UserRole::User);
        new_user.cat_api_base = "http://cat.local/".into();
        let user = insert_user(db.as_ref(), new_user).await.unwrap();

        let outcome = service
            .import_user_sites(user.id, vec![Site::new("p1", "P1", "/spider/p1/"), Site::new("p2", "P2", "/spider/p2/")])
            .await
            .unwrap();
        assert!(outcome.refreshed);
        assert_eq!(outcome.count, 2);

        service.set_user_availability(user.id, "p2", Availability::SearchError).await.unwrap();
        service.set_user_home(user.id, "p1", false).await.unwrap();
        let order = service.set_user_order(user.id, &["p2".into()]).await.unwrap();
        assert_eq!(order, vec!["p2", "p1"]);

        // 重新导入时保留个人设置，新站点插在前一个站点之后
        let outcome = service
            .import_user_sites(
                user.id,
                vec![
                    Site::new("p1", "P1", "/spider/p1/"),
                    Site::new("p3", "P3", "/spider/p3/"),
                    Site::new("p2", "P2", "/spider/p2/"),
                ],
            )
            .await
            .unwrap();
        let keys: Vec<&str> = outcome.sites.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["p2", "p1", "p3"]);
        let p2 = outcome.sites.iter().find(|r| r.key == "p2").unwrap();
        assert_eq!(p2.availability, Availability::SearchError);

        let home: Vec<String> = service
            .user_home_sites(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(home, vec!["p2", "p3"]);
    }

    #[tokio::test]
    async fn test_global_import_reports_canonical_rewrite() {
        use crate::settings::keys;

        let db = Arc::new(setup_memory_database().await);
        let settings = Arc::new(SettingsStore::new(db.clone()));
        let service = SiteService::new(db, settings.clone());

        // 字段顺序与规范形式不同，但解析后与导入内容一致
        settings
            .set(keys::VIDEO_SOURCE_SITES, r#"[{"name":"A","key":"a","api":"/spider/a/"}]"#)
            .await
            .unwrap();
        settings.set(keys::VIDEO_SOURCE_SITE_STATUS, r#"{"a":true}"#).await.unwrap();
        settings.set(keys::VIDEO_SOURCE_SITE_HOME, r#"{"a":true}"#).await.unwrap();
        settings.set(keys::VIDEO_SOURCE_SITE_ORDER, r#"["a"]"#).await.unwrap();
        settings
            .set(keys::VIDEO_SOURCE_SITE_AVAILABILITY, r#"{"a":"unchecked"}"#)
            .await
            .unwrap();

        let before = settings.version();
        let outcome = service.import_global(vec![Site::new("a", "A", "/spider/a/")]).await.unwrap();
        assert!(outcome.refreshed);
        assert_eq!(settings.version(), before + 1);
        assert_eq!(
            settings.get(keys::VIDEO_SOURCE_SITES).await.unwrap(),
            r#"[{"key":"a","name":"A","api":"/spider/a/"}]"#
        );

        // 已是规范形式时不写入，也不报告刷新
        let outcome = service.import_global(vec![Site::new("a", "A", "/spider/a/")]).await.unwrap();
        assert!(!outcome.refreshed);
        assert_eq!(settings.version(), before + 1);
    }

    #[tokio::test]
    async fn test_global_toggle_leaves_other_keys_untouched() {
        use crate::settings::keys;

        let db = Arc::new(setup_memory_database().await);
        let settings = Arc::new(SettingsStore::new(db.clone()));
        let service = SiteService::new(db, settings.clone());
        service.import_global(catalog()).await.unwrap();

        // 手工写入的非规范文本
        let search = r#"{ "a" : true }"#;
        let order = r#"[ "c", "a" ]"#;
        settings.set(keys::VIDEO_SOURCE_SITE_SEARCH, search).await.unwrap();
        settings.set(keys::VIDEO_SOURCE_SEARCH_ORDER, order).await.unwrap();

        service.set_global_status("a", false).await.unwrap();
        assert_eq!(settings.get(keys::VIDEO_SOURCE_SITE_STATUS).await.unwrap(), r#"{"a":false,"b":true,"c":true}"#);
        assert_eq!(settings.get(keys::VIDEO_SOURCE_SITE_SEARCH).await.unwrap(), search);
        assert_eq!(settings.get(keys::VIDEO_SOURCE_SEARCH_ORDER).await.unwrap(), order);
        assert_eq!(settings.get(keys::VIDEO_SOURCE_SITE_ERROR).await.unwrap(), "{}");
    }
}
