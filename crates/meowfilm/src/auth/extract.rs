use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use meowfilm_entity::users::{self, UserRole};

use super::error::AuthError;
use super::session::{token_from_headers, SessionManager};
use crate::api::error::InnerApiError;
use crate::api::wrapper::ApiError;

/// 当前登录且状态正常的用户
#[derive(Debug, Clone)]
pub struct CurrentUser(pub users::Model);

/// 可选的登录用户：未登录、会话失效或账户被禁用时为 `None`
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<users::Model>);

/// 当前登录的管理员
#[derive(Debug, Clone)]
pub struct AdminUser(pub users::Model);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let sessions = parts
            .extensions
            .get::<Arc<SessionManager>>()
            .cloned()
            .ok_or_else(|| anyhow!("会话管理器未注册"))?;
        let token = token_from_headers(&parts.headers).ok_or(InnerApiError::Unauthorized)?;
        let user = sessions.resolve(&token).await?.ok_or(InnerApiError::Unauthorized)?;
        if !user.is_active() {
            return Err(AuthError::Disabled.into());
        }
        Ok(CurrentUser(user))
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let sessions = parts
            .extensions
            .get::<Arc<SessionManager>>()
            .cloned()
            .ok_or_else(|| anyhow!("会话管理器未注册"))?;
        let Some(token) = token_from_headers(&parts.headers) else {
            return Ok(MaybeUser(None));
        };
        let user = sessions.resolve(&token).await?.filter(|user| user.is_active());
        Ok(MaybeUser(user))
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.user_role() != UserRole::Admin {
            return Err(InnerApiError::Forbidden.into());
        }
        Ok(AdminUser(user))
    }
}
