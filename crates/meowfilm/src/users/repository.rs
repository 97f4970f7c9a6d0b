use meowfilm_entity::entities::{auth_tokens, favorites, play_history, prelude::*, search_history, users};
use meowfilm_entity::users::{UserRole, UserStatus};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use utoipa::ToSchema;

/// 新建用户所需的字段，密码须已经过哈希
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    pub cat_api_base: String,
    pub cat_proxy: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            role,
            cat_api_base: String::new(),
            cat_proxy: String::new(),
        }
    }
}

/// 插入用户，其余字段使用表默认值
pub async fn insert_user<C: ConnectionTrait>(db: &C, user: NewUser) -> Result<users::Model, DbErr> {
    users::ActiveModel {
        username: Set(user.username),
        password: Set(user.password_hash),
        role: Set(user.role.to_string()),
        status: Set(UserStatus::Active.to_string()),
        cat_api_base: Set(user.cat_api_base),
        cat_proxy: Set(user.cat_proxy),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn find_by_username<C: ConnectionTrait>(db: &C, username: &str) -> Result<Option<users::Model>, DbErr> {
    User::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await
}

pub async fn admin_exists<C: ConnectionTrait>(db: &C) -> Result<bool, DbErr> {
    let count = User::find()
        .filter(users::Column::Role.eq(UserRole::Admin.as_ref()))
        .count(db)
        .await?;
    Ok(count > 0)
}

pub async fn count_users<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
    User::find().count(db).await
}

/// 管理员排在最前，其余按用户名排序
pub async fn list_users<C: ConnectionTrait>(db: &C) -> Result<Vec<users::Model>, DbErr> {
    User::find()
        .order_by(
            Expr::cust("CASE WHEN role = 'admin' THEN 0 ELSE 1 END"),
            Order::Asc,
        )
        .order_by_asc(users::Column::Username)
        .all(db)
        .await
}

/// 删除用户时各表清理的行数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedRows {
    pub token_deleted: u64,
    pub history_deleted: u64,
    pub play_history_deleted: u64,
    pub favorites_deleted: u64,
    pub user_deleted: u64,
}

/// 删除用户及其登录令牌、搜索历史、播放历史与收藏
pub async fn delete_user<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<DeletedRows, DbErr> {
    let tokens = AuthToken::delete_many()
        .filter(auth_tokens::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    let history = SearchHistory::delete_many()
        .filter(search_history::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    let play = PlayHistory::delete_many()
        .filter(play_history::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    let favorites = Favorite::delete_many()
        .filter(favorites::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    let user = User::delete_by_id(user_id).exec(db).await?;
    Ok(DeletedRows {
        token_deleted: tokens.rows_affected,
        history_deleted: history.rows_affected,
        play_history_deleted: play.rows_affected,
        favorites_deleted: favorites.rows_affected,
        user_deleted: user.rows_affected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup_memory_database;

    #[tokio::test]
    async fn test_insert_uses_column_defaults() {
        let db = setup_memory_database().await;
        let user = insert_user(&db, NewUser::new("alice", "hash", UserRole::Shared))
            .await
            .unwrap();
        assert_eq!(user.role, "shared");
        assert!(user.is_active());
        assert_eq!(user.search_thread_count, 5);
        assert_eq!(user.cat_sites, "[]");
        assert_eq!(user.cat_site_status, "{}");
        assert_eq!(user.revision, 0);

        // 用户名唯一
        assert!(insert_user(&db, NewUser::new("alice", "hash", UserRole::User)).await.is_err());
    }

    #[tokio::test]
    async fn test_list_puts_admin_first() {
        let db = setup_memory_database().await;
        for (name, role) in [("bob", UserRole::User), ("zed", UserRole::Admin), ("amy", UserRole::Shared)] {
            insert_user(&db, NewUser::new(name, "hash", role)).await.unwrap();
        }
        let names: Vec<String> = list_users(&db).await.unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["zed", "amy", "bob"]);
        assert!(admin_exists(&db).await.unwrap());
    }
}
