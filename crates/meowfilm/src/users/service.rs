use std::sync::Arc;

use anyhow::{Context, Result};
use meowfilm_entity::users::{self, UserRole, UserStatus};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use super::error::UserError;
use super::repository::{self, DeletedRows, NewUser};
use super::settings::{apply_settings, SettingsUpdate, SitesSync, UserSettings};
use crate::auth::password::hash_password_blocking;
use crate::database::begin_write_transaction;
use crate::sites::SiteService;
use crate::utils::api_base::normalize_api_base;

/// 用户列表中的一行
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserSummary {
    pub username: String,
    pub role: String,
    pub status: String,
    pub cat_api_base: String,
    pub cat_proxy: String,
}

impl From<users::Model> for UserSummary {
    fn from(model: users::Model) -> Self {
        Self {
            username: model.username,
            role: model.role,
            status: model.status,
            cat_api_base: model.cat_api_base,
            cat_proxy: model.cat_proxy,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AddUser {
    pub username: String,
    pub password: String,
    pub role: String,
    pub cat_api_base: String,
    pub cat_proxy: String,
}

/// 管理员修改用户，`None` 表示不修改
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: String,
    pub new_username: Option<String>,
    pub new_password: Option<String>,
    pub role: Option<String>,
    pub cat_api_base: Option<String>,
    pub cat_proxy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedUser {
    pub username: String,
    pub role: String,
    pub cat_api_base: String,
    pub cat_proxy: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// 管理员只能授予共享或普通角色
fn assignable_role(raw: &str) -> Option<UserRole> {
    match raw.trim() {
        "shared" => Some(UserRole::Shared),
        "user" => Some(UserRole::User),
        _ => None,
    }
}

fn normalize_optional_api_base(raw: &str) -> Result<String, UserError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }
    normalize_api_base(raw).ok_or(UserError::InvalidApiBase)
}

/// 用户个人设置与后台用户管理
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    sites: SiteService,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, sites: SiteService) -> Self {
        Self { db, sites }
    }

    pub async fn settings(&self, user_id: i32) -> Result<UserSettings> {
        let model = self.sites.users().find(user_id).await?;
        Ok(UserSettings::from_model(&model))
    }

    pub async fn save_settings(&self, user_id: i32, update: SettingsUpdate) -> Result<SitesSync> {
        let global_sites = self.sites.global().sites().await?;
        let (sync, written) = self
            .sites
            .users()
            .modify(user_id, |model| Ok(apply_settings(model, update, &global_sites)?))
            .await?;
        if written {
            info!("用户 {} 的个人设置已保存", user_id);
        }
        Ok(sync)
    }

    pub async fn list(&self) -> Result<Vec<UserSummary>> {
        let users = repository::list_users(self.db.as_ref())
            .await
            .context("读取用户列表失败")?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        repository::count_users(self.db.as_ref())
            .await
            .context("统计用户数量失败")
    }

    pub async fn add(&self, input: AddUser) -> Result<UserSummary> {
        let username = input.username.trim().to_string();
        let password = input.password.trim().to_string();
        if username.is_empty() || password.is_empty() {
            return Err(UserError::AddFailed.into());
        }
        let role = if input.role.trim() == "shared" {
            UserRole::Shared
        } else {
            UserRole::User
        };
        let mut new_user = NewUser::new(username, hash_password_blocking(password).await?, role);
        new_user.cat_api_base = normalize_optional_api_base(&input.cat_api_base)?;
        new_user.cat_proxy = input.cat_proxy.trim().to_string();

        let user = repository::insert_user(self.db.as_ref(), new_user)
            .await
            .map_err(|_| UserError::AddFailed)?;
        info!("已添加用户 {}（{}）", user.username, user.role);
        Ok(user.into())
    }

    /// 在启用与禁用之间切换，返回新状态；管理员不可禁用
    pub async fn toggle_ban(&self, username: &str) -> Result<UserStatus> {
        let username = username.trim();
        if username.is_empty() {
            return Err(UserError::EmptyUsername.into());
        }
        let txn = begin_write_transaction(&self.db).await?;
        let user = repository::find_by_username(&txn, username)
            .await?
            .filter(|u| u.user_role() != UserRole::Admin)
            .ok_or(UserError::BanFailed)?;
        let next = if user.is_active() {
            UserStatus::Banned
        } else {
            UserStatus::Active
        };
        let mut active: users::ActiveModel = user.into();
        active.status = Set(next.to_string());
        active.update(&txn).await?;
        txn.commit().await?;
        info!("用户 {} 状态已改为 {}", username, next);
        Ok(next)
    }

    /// 删除用户及其登录令牌，返回删除的令牌数；管理员不可删除
    pub async fn delete(&self, username: &str) -> Result<DeletedRows> {
        let username = username.trim();
        if username.is_empty() {
            return Err(UserError::EmptyUsername.into());
        }
        let txn = begin_write_transaction(&self.db).await?;
        let user = repository::find_by_username(&txn, username)
            .await?
            .filter(|u| u.user_role() != UserRole::Admin)
            .ok_or(UserError::DeleteFailed)?;
        let deleted = repository::delete_user(&txn, user.id).await?;
        txn.commit().await?;
        info!(
            "已删除用户 {}，同时清理 {} 个登录令牌、{} 条搜索历史、{} 条播放历史、{} 个收藏",
            username,
            deleted.token_deleted,
            deleted.history_deleted,
            deleted.play_history_deleted,
            deleted.favorites_deleted
        );
        Ok(deleted)
    }

    pub async fn update(&self, input: UpdateUser) -> Result<UpdatedUser> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(UserError::EmptyUsername.into());
        }
        let new_username = non_empty(input.new_username);
        let new_password = non_empty(input.new_password);
        let role = non_empty(input.role);
        if new_username.is_none()
            && new_password.is_none()
            && role.is_none()
            && input.cat_api_base.is_none()
            && input.cat_proxy.is_none()
        {
            return Err(UserError::NothingToUpdate.into());
        }
        let password_hash = match new_password {
            Some(password) => Some(hash_password_blocking(password).await?),
            None => None,
        };
        let cat_api_base = input
            .cat_api_base
            .as_deref()
            .map(normalize_optional_api_base)
            .transpose()?;

        let txn = begin_write_transaction(&self.db).await?;
        let user = repository::find_by_username(&txn, username)
            .await?
            .ok_or(UserError::NotFound)?;
        let mut active: users::ActiveModel = user.clone().into();

        if let Some(new_username) = new_username.filter(|n| *n != user.username) {
            if repository::find_by_username(&txn, &new_username).await?.is_some() {
                return Err(UserError::UsernameTaken.into());
            }
            active.username = Set(new_username);
        }
        if let Some(hash) = password_hash {
            active.password = Set(hash);
        }
        if let Some(role) = role {
            if user.user_role() == UserRole::Admin {
                return Err(UserError::AdminRoleImmutable.into());
            }
            let role = assignable_role(&role).ok_or(UserError::InvalidRole)?;
            active.role = Set(role.to_string());
        }
        if let Some(base) = cat_api_base {
            active.cat_api_base = Set(base);
        }
        if let Some(proxy) = input.cat_proxy {
            active.cat_proxy = Set(proxy.trim().to_string());
        }
        // 角色与接口地址会影响站点作用域
        active.revision = Set(user.revision + 1);

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        info!("已修改用户 {}", updated.username);
        Ok(UpdatedUser {
            username: updated.username,
            role: updated.role,
            cat_api_base: updated.cat_api_base,
            cat_proxy: updated.cat_proxy,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use meowfilm_entity::entities::{auth_tokens, prelude::AuthToken};
    use sea_orm::EntityTrait;

    use super::*;
    use crate::database::setup_memory_database;
    use crate::settings::SettingsStore;

    async fn new_service() -> (UserService, Arc<DatabaseConnection>) {
        let db = Arc::new(setup_memory_database().await);
        let settings = Arc::new(SettingsStore::new(db.clone()));
        let sites = SiteService::new(db.clone(), settings);
        (UserService::new(db.clone(), sites), db)
    }

    async fn seed(db: &DatabaseConnection, name: &str, role: UserRole) -> users::Model {
        repository::insert_user(db, NewUser::new(name, "hash", role)).await.unwrap()
    }

    fn user_error(err: &anyhow::Error) -> Option<&UserError> {
        err.downcast_ref::<UserError>()
    }

    #[tokio::test]
    async fn test_toggle_ban_and_admin_protection() {
        let (service, db) = new_service().await;
        seed(&db, "root", UserRole::Admin).await;
        seed(&db, "bob", UserRole::User).await;

        assert_eq!(service.toggle_ban("bob").await.unwrap(), UserStatus::Banned);
        assert_eq!(service.toggle_ban(" bob ").await.unwrap(), UserStatus::Active);

        let err = service.toggle_ban("root").await.unwrap_err();
        assert_matches!(user_error(&err), Some(UserError::BanFailed));
        let err = service.toggle_ban("ghost").await.unwrap_err();
        assert_matches!(user_error(&err), Some(UserError::BanFailed));
        let err = service.toggle_ban("  ").await.unwrap_err();
        assert_matches!(user_error(&err), Some(UserError::EmptyUsername));
    }

    #[tokio::test]
    async fn test_delete_removes_tokens_and_history() {
        let (service, db) = new_service().await;
        let bob = seed(&db, "bob", UserRole::Shared).await;
        seed(&db, "root", UserRole::Admin).await;
        AuthToken::insert(auth_tokens::ActiveModel {
            token: Set("t1".into()),
            user_id: Set(bob.id),
            created_at: Set(0),
            expires_at: Set(i64::MAX),
        })
        .exec(db.as_ref())
        .await
        .unwrap();

        let history = crate::history::HistoryService::new(db.clone());
        history.record_search(bob.id, "三体").await.unwrap();
        history
            .toggle_favorite(
                bob.id,
                crate::history::NewFavorite {
                    site_key: "a".into(),
                    spider_api: "/spider/a/".into(),
                    video_id: "1".into(),
                    video_title: "三体".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let deleted = service.delete("bob").await.unwrap();
        assert_eq!(
            deleted,
            DeletedRows {
                token_deleted: 1,
                history_deleted: 1,
                play_history_deleted: 0,
                favorites_deleted: 1,
                user_deleted: 1,
            }
        );
        assert!(history.search_keywords(bob.id).await.unwrap().is_empty());
        assert!(AuthToken::find_by_id("t1".to_string()).one(db.as_ref()).await.unwrap().is_none());
        let names: Vec<String> = service.list().await.unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["root"]);
        assert_eq!(service.count().await.unwrap(), 1);

        let err = service.delete("root").await.unwrap_err();
        assert_matches!(user_error(&err), Some(UserError::DeleteFailed));
    }

    #[tokio::test]
    async fn test_update_user_fields() {
        let (service, db) = new_service().await;
        let bob = seed(&db, "bob", UserRole::User).await;
        seed(&db, "amy", UserRole::User).await;
        seed(&db, "root", UserRole::Admin).await;

        let err = service
            .update(UpdateUser {
                username: "bob".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_matches!(user_error(&err), Some(UserError::NothingToUpdate));

        let err = service
            .update(UpdateUser {
                username: "bob".into(),
                new_username: Some("amy".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_matches!(user_error(&err), Some(UserError::UsernameTaken));

        let err = service
            .update(UpdateUser {
                username: "bob".into(),
                role: Some("admin".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_matches!(user_error(&err), Some(UserError::InvalidRole));

        let err = service
            .update(UpdateUser {
                username: "root".into(),
                role: Some("user".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_matches!(user_error(&err), Some(UserError::AdminRoleImmutable));

        let updated = service
            .update(UpdateUser {
                username: "bob".into(),
                new_username: Some("robert".into()),
                role: Some("shared".into()),
                cat_api_base: Some("http://cat.local/config".into()),
                cat_proxy: Some(" http://proxy/ ".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            updated,
            UpdatedUser {
                username: "robert".into(),
                role: "shared".into(),
                cat_api_base: "http://cat.local/".into(),
                cat_proxy: "http://proxy/".into(),
            }
        );
        let stored = repository::find_by_username(db.as_ref(), "robert").await.unwrap().unwrap();
        assert_eq!(stored.id, bob.id);
        assert_eq!(stored.revision, bob.revision + 1);
    }

    #[tokio::test]
    async fn test_settings_round_trip_through_store() {
        let (service, db) = new_service().await;
        let user = seed(&db, "bob", UserRole::User).await;

        let err = service.save_settings(user.id, SettingsUpdate::default()).await.unwrap_err();
        assert_matches!(user_error(&err), Some(UserError::ApiBaseRequired));

        let sync = service
            .save_settings(
                user.id,
                SettingsUpdate {
                    cat_api_base: Some("http://cat.local/".into()),
                    search_thread_count: Some(serde_json::json!(8)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(sync.ok);
        assert!(!sync.refreshed);

        let settings = service.settings(user.id).await.unwrap();
        assert_eq!(settings.cat_api_base, "http://cat.local/");
        assert_eq!(settings.search_thread_count, 8);
    }
}
