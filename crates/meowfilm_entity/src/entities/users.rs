use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// 用户实体，同时承载该用户私有的站点配置
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    pub role: String,
    pub status: String,
    pub cat_api_base: String,
    pub cat_api_key: String,
    pub cat_proxy: String,
    pub search_thread_count: i32,
    #[sea_orm(column_type = "Text")]
    pub cat_sites: String,
    #[sea_orm(column_type = "Text")]
    pub cat_site_status: String,
    #[sea_orm(column_type = "Text")]
    pub cat_site_home: String,
    #[sea_orm(column_type = "Text")]
    pub cat_site_order: String,
    #[sea_orm(column_type = "Text")]
    pub cat_site_availability: String,
    #[sea_orm(column_type = "Text")]
    pub cat_search_order: String,
    pub cat_search_cover_site: String,
    /// 每次写入站点配置时自增，用于检测并发修改
    pub revision: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::auth_tokens::Entity")]
    AuthTokens,
}

impl Related<super::auth_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    Shared,
    #[default]
    User,
}

impl UserRole {
    /// 无法识别的角色一律按普通用户处理
    pub fn parse_lossy(s: &str) -> Self {
        s.trim().parse().unwrap_or_default()
    }
}

/// 账户状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserStatus {
    Active,
    Banned,
}

impl Model {
    pub fn user_role(&self) -> UserRole {
        UserRole::parse_lossy(&self.role)
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active.as_ref()
    }
}
