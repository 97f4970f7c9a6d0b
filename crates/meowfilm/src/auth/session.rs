use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use meowfilm_entity::entities::{auth_tokens, prelude::*, users};
use meowfilm_entity::users::UserRole;
use rand::Rng;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::password::{hash_password_blocking, verify_password_blocking};
use crate::users::repository::{admin_exists, find_by_username, insert_user, NewUser};

pub const SESSION_COOKIE: &str = "meowfilm_auth";
const SESSION_TTL_DAYS: i64 = 30;
const DEFAULT_ADMIN: &str = "admin";

/// 登录会话：签发、解析与注销令牌
pub struct SessionManager {
    db: Arc<DatabaseConnection>,
    cookie_secure: bool,
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// 从请求头中取出会话令牌
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(|cookie| cookie.ok())
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

impl SessionManager {
    pub fn new(db: Arc<DatabaseConnection>, cookie_secure: bool) -> Self {
        Self { db, cookie_secure }
    }

    /// 校验用户名密码并签发新令牌
    pub async fn login(&self, username: &str, password: &str) -> Result<(users::Model, String)> {
        let user = find_by_username(self.db.as_ref(), username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password_blocking(password.to_string(), user.password.clone()).await? {
            warn!("用户 {} 登录失败：密码错误", user.username);
            return Err(AuthError::InvalidCredentials.into());
        }
        if !user.is_active() {
            return Err(AuthError::Disabled.into());
        }

        let now = Utc::now();
        AuthToken::delete_many()
            .filter(auth_tokens::Column::UserId.eq(user.id))
            .filter(auth_tokens::Column::ExpiresAt.lte(now.timestamp_millis()))
            .exec(self.db.as_ref())
            .await
            .context("清理过期令牌失败")?;

        let token = generate_token();
        AuthToken::insert(auth_tokens::ActiveModel {
            token: Set(token.clone()),
            user_id: Set(user.id),
            created_at: Set(now.timestamp_millis()),
            expires_at: Set((now + Duration::days(SESSION_TTL_DAYS)).timestamp_millis()),
        })
        .exec(self.db.as_ref())
        .await
        .context("保存登录令牌失败")?;
        info!("用户 {} 登录成功", user.username);
        Ok((user, token))
    }

    /// 解析令牌对应的用户，过期令牌会被删除
    pub async fn resolve(&self, token: &str) -> Result<Option<users::Model>> {
        let Some(row) = AuthToken::find_by_id(token.to_string()).one(self.db.as_ref()).await? else {
            return Ok(None);
        };
        if row.expires_at <= Utc::now().timestamp_millis() {
            debug!("用户 {} 的令牌已过期", row.user_id);
            AuthToken::delete_by_id(row.token).exec(self.db.as_ref()).await?;
            return Ok(None);
        }
        Ok(User::find_by_id(row.user_id).one(self.db.as_ref()).await?)
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        AuthToken::delete_by_id(token.to_string())
            .exec(self.db.as_ref())
            .await
            .context("删除登录令牌失败")?;
        Ok(())
    }

    /// 没有任何管理员时创建默认账户 admin/admin，返回是否创建
    pub async fn ensure_default_admin(&self) -> Result<bool> {
        if admin_exists(self.db.as_ref()).await? {
            return Ok(false);
        }
        if find_by_username(self.db.as_ref(), DEFAULT_ADMIN).await?.is_some() {
            warn!("不存在管理员账户，且用户名 {} 已被占用，跳过创建默认管理员", DEFAULT_ADMIN);
            return Ok(false);
        }
        let hash = hash_password_blocking(DEFAULT_ADMIN.to_string()).await?;
        insert_user(self.db.as_ref(), NewUser::new(DEFAULT_ADMIN, hash, UserRole::Admin))
            .await
            .context("创建默认管理员失败")?;
        warn!("已创建默认管理员 admin/admin，请尽快修改密码");
        Ok(true)
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::days(SESSION_TTL_DAYS))
            .build()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .build();
        cookie.make_removal();
        cookie
    }
}
