use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use meowfilm_entity::entities::{prelude::User, users};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::debug;

use super::error::SiteError;
use super::model::Site;
use super::overlay::{order_from_json, ErrorMap, SearchMap, SiteColumns, SiteOrder, SiteState};
use crate::database::begin_write_transaction;
use crate::settings::{keys, SettingsBatch, SettingsStore};
use crate::utils::convert::{bool_map_from_json, string_map_from_json, to_json_string};

/// 全局站点目录的完整快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalSiteSnapshot {
    pub state: SiteState,
    pub search: SearchMap,
    pub errors: ErrorMap,
    pub search_order: SiteOrder,
    pub search_cover_site: String,
}

impl GlobalSiteSnapshot {
    fn parse<'a>(get: impl Fn(&str) -> &'a str) -> Self {
        Self {
            state: global_site_columns(&get).parse(),
            search: bool_map_from_json(get(keys::VIDEO_SOURCE_SITE_SEARCH)),
            errors: string_map_from_json(get(keys::VIDEO_SOURCE_SITE_ERROR)),
            search_order: order_from_json(get(keys::VIDEO_SOURCE_SEARCH_ORDER)),
            search_cover_site: get(keys::VIDEO_SOURCE_SEARCH_COVER_SITE).trim().to_string(),
        }
    }

    /// 只写回相对 `before` 发生变化的字段，未触及的键保持原样
    fn write_changes(&self, before: &Self, batch: &mut SettingsBatch) {
        let (now, old) = (&self.state, &before.state);
        if now.sites != old.sites {
            batch.set(keys::VIDEO_SOURCE_SITES, to_json_string(&now.sites));
        }
        if now.overlays.status != old.overlays.status {
            batch.set(keys::VIDEO_SOURCE_SITE_STATUS, to_json_string(&now.overlays.status));
        }
        if now.overlays.home != old.overlays.home {
            batch.set(keys::VIDEO_SOURCE_SITE_HOME, to_json_string(&now.overlays.home));
        }
        if now.overlays.order != old.overlays.order {
            batch.set(keys::VIDEO_SOURCE_SITE_ORDER, to_json_string(&now.overlays.order));
        }
        if now.overlays.availability != old.overlays.availability {
            batch.set(
                keys::VIDEO_SOURCE_SITE_AVAILABILITY,
                to_json_string(&now.overlays.availability),
            );
        }
        if self.search != before.search {
            batch.set(keys::VIDEO_SOURCE_SITE_SEARCH, to_json_string(&self.search));
        }
        if self.errors != before.errors {
            batch.set(keys::VIDEO_SOURCE_SITE_ERROR, to_json_string(&self.errors));
        }
        if self.search_order != before.search_order {
            batch.set(keys::VIDEO_SOURCE_SEARCH_ORDER, to_json_string(&self.search_order));
        }
        if self.search_cover_site != before.search_cover_site {
            batch.set(keys::VIDEO_SOURCE_SEARCH_COVER_SITE, self.search_cover_site.clone());
        }
    }
}

/// 全局站点状态在设置表中的原始文本
fn global_site_columns<'a>(get: impl Fn(&str) -> &'a str) -> SiteColumns {
    SiteColumns {
        sites: get(keys::VIDEO_SOURCE_SITES).to_string(),
        status: get(keys::VIDEO_SOURCE_SITE_STATUS).to_string(),
        home: get(keys::VIDEO_SOURCE_SITE_HOME).to_string(),
        order: get(keys::VIDEO_SOURCE_SITE_ORDER).to_string(),
        availability: get(keys::VIDEO_SOURCE_SITE_AVAILABILITY).to_string(),
    }
}

fn write_site_columns(columns: SiteColumns, batch: &mut SettingsBatch) {
    batch.set(keys::VIDEO_SOURCE_SITES, columns.sites);
    batch.set(keys::VIDEO_SOURCE_SITE_STATUS, columns.status);
    batch.set(keys::VIDEO_SOURCE_SITE_HOME, columns.home);
    batch.set(keys::VIDEO_SOURCE_SITE_ORDER, columns.order);
    batch.set(keys::VIDEO_SOURCE_SITE_AVAILABILITY, columns.availability);
}

/// 全局站点目录的类型化访问，底层为设置表
#[derive(Clone)]
pub struct GlobalSiteRepository {
    store: Arc<SettingsStore>,
}

impl GlobalSiteRepository {
    pub fn new(store: Arc<SettingsStore>) -> Self {
        Self { store }
    }

    pub async fn snapshot(&self) -> Result<GlobalSiteSnapshot> {
        let mut values: HashMap<&str, String> = HashMap::with_capacity(keys::GLOBAL_SITE_KEYS.len());
        for key in keys::GLOBAL_SITE_KEYS {
            values.insert(key, self.store.get(key).await?);
        }
        Ok(GlobalSiteSnapshot::parse(|key| values.get(key).map(String::as_str).unwrap_or_default()))
    }

    pub async fn sites(&self) -> Result<Vec<Site>> {
        Ok(super::model::sites_from_json(&self.store.get(keys::VIDEO_SOURCE_SITES).await?))
    }

    /// 在一个写事务中读取最新快照、修改并写回，只写入解析后的值发生变化的键
    pub async fn modify<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut GlobalSiteSnapshot) -> Result<T>,
    {
        self.store
            .update(&keys::GLOBAL_SITE_KEYS, |batch| {
                let before = GlobalSiteSnapshot::parse(|key| batch.get(key));
                let mut snapshot = before.clone();
                let result = f(&mut snapshot)?;
                snapshot.write_changes(&before, batch);
                Ok(result)
            })
            .await
    }

    /// 与 `modify` 相同，但站点目录的五个字段总以规范形式整体写回。
    ///
    /// 返回值中的布尔表示这五个字段的存储文本是否发生了变化，即是否实际写入。
    pub async fn replace_sites<T, F>(&self, f: F) -> Result<(T, bool)>
    where
        F: FnOnce(&mut GlobalSiteSnapshot) -> Result<T>,
    {
        self.store
            .update(&keys::GLOBAL_SITE_KEYS, |batch| {
                let raw = global_site_columns(|key| batch.get(key));
                let before = GlobalSiteSnapshot::parse(|key| batch.get(key));
                let mut snapshot = before.clone();
                let result = f(&mut snapshot)?;

                let mut rest = snapshot.clone();
                rest.state = before.state.clone();
                rest.write_changes(&before, batch);

                let columns = SiteColumns::from_state(&snapshot.state);
                let refreshed = columns != raw;
                write_site_columns(columns, batch);
                Ok((result, refreshed))
            })
            .await
    }
}

/// 用户私有站点配置的读写，写入时以 revision 做比较并交换
#[derive(Clone)]
pub struct UserSiteRepository {
    db: Arc<DatabaseConnection>,
}

impl UserSiteRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find(&self, user_id: i32) -> Result<users::Model> {
        let model = User::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .context("读取用户失败")?
            .ok_or(SiteError::UserNotFound(user_id))?;
        Ok(model)
    }

    /// 在一个写事务中重新读取用户行，交给 `f` 修改后写回。
    ///
    /// 行内容没有变化时不写入；返回 `f` 的结果以及是否写入。
    pub async fn modify<T, F>(&self, user_id: i32, f: F) -> Result<(T, bool)>
    where
        F: FnOnce(&mut users::Model) -> Result<T>,
    {
        let txn = begin_write_transaction(&self.db).await?;
        let current = User::find_by_id(user_id)
            .one(&txn)
            .await
            .context("读取用户失败")?
            .ok_or(SiteError::UserNotFound(user_id))?;

        let mut next = current.clone();
        let result = f(&mut next)?;
        if next == current {
            debug!("用户 {} 的站点配置未变化，跳过写入", user_id);
            return Ok((result, false));
        }

        compare_and_swap(&txn, &current, &next).await?;
        txn.commit().await.context("提交用户站点配置失败")?;
        Ok((result, true))
    }
}

/// 仅当数据库中的 revision 仍为 `previous.revision` 时写入，并递增 revision
pub async fn compare_and_swap<C: ConnectionTrait>(
    db: &C,
    previous: &users::Model,
    next: &users::Model,
) -> Result<(), SiteError> {
    let result = User::update_many()
        .col_expr(users::Column::CatApiBase, Expr::value(next.cat_api_base.clone()))
        .col_expr(users::Column::CatApiKey, Expr::value(next.cat_api_key.clone()))
        .col_expr(users::Column::CatProxy, Expr::value(next.cat_proxy.clone()))
        .col_expr(users::Column::SearchThreadCount, Expr::value(next.search_thread_count))
        .col_expr(users::Column::CatSites, Expr::value(next.cat_sites.clone()))
        .col_expr(users::Column::CatSiteStatus, Expr::value(next.cat_site_status.clone()))
        .col_expr(users::Column::CatSiteHome, Expr::value(next.cat_site_home.clone()))
        .col_expr(users::Column::CatSiteOrder, Expr::value(next.cat_site_order.clone()))
        .col_expr(users::Column::CatSiteAvailability, Expr::value(next.cat_site_availability.clone()))
        .col_expr(users::Column::CatSearchOrder, Expr::value(next.cat_search_order.clone()))
        .col_expr(users::Column::CatSearchCoverSite, Expr::value(next.cat_search_cover_site.clone()))
        .col_expr(users::Column::Revision, Expr::value(previous.revision + 1))
        .filter(users::Column::Id.eq(previous.id))
        .filter(users::Column::Revision.eq(previous.revision))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(SiteError::Conflict(previous.id));
    }
    Ok(())
}

/// 用户行中的站点字段
pub fn user_site_columns(model: &users::Model) -> SiteColumns {
    SiteColumns {
        sites: model.cat_sites.clone(),
        status: model.cat_site_status.clone(),
        home: model.cat_site_home.clone(),
        order: model.cat_site_order.clone(),
        availability: model.cat_site_availability.clone(),
    }
}

/// 写回站点字段；`include_sites` 为假时保留原有的私有站点列表
pub fn store_user_site_columns(model: &mut users::Model, columns: SiteColumns, include_sites: bool) {
    if include_sites {
        model.cat_sites = columns.sites;
    }
    model.cat_site_status = columns.status;
    model.cat_site_home = columns.home;
    model.cat_site_order = columns.order;
    model.cat_site_availability = columns.availability;
}
