use meowfilm_entity::entities::{favorites, prelude::Favorite as FavoriteEntity};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub site_key: String,
    pub site_name: String,
    pub spider_api: String,
    pub video_id: String,
    pub video_title: String,
    pub video_poster: String,
    pub video_remark: String,
    pub updated_at: i64,
}

impl From<favorites::Model> for Favorite {
    fn from(row: favorites::Model) -> Self {
        Self {
            site_key: row.site_key,
            site_name: row.site_name,
            spider_api: row.spider_api,
            video_id: row.video_id,
            video_title: row.video_title,
            video_poster: row.video_poster,
            video_remark: row.video_remark,
            updated_at: row.updated_at,
        }
    }
}

/// 收藏切换请求中的影片信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewFavorite {
    pub site_key: String,
    pub site_name: String,
    pub spider_api: String,
    pub video_id: String,
    pub video_title: String,
    pub video_poster: String,
    pub video_remark: String,
}

impl NewFavorite {
    pub fn is_complete(&self) -> bool {
        [&self.site_key, &self.spider_api, &self.video_id, &self.video_title]
            .iter()
            .all(|field| !field.is_empty())
    }
}

pub async fn list<C: ConnectionTrait>(db: &C, user_id: i32, limit: u64) -> Result<Vec<Favorite>, DbErr> {
    let rows = FavoriteEntity::find()
        .filter(favorites::Column::UserId.eq(user_id))
        .order_by_desc(favorites::Column::UpdatedAt)
        .order_by_desc(favorites::Column::Id)
        .limit(limit)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(Favorite::from).collect())
}

pub async fn exists<C: ConnectionTrait>(db: &C, user_id: i32, site_key: &str, video_id: &str) -> Result<bool, DbErr> {
    let count = FavoriteEntity::find()
        .filter(favorites::Column::UserId.eq(user_id))
        .filter(favorites::Column::SiteKey.eq(site_key))
        .filter(favorites::Column::VideoId.eq(video_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

pub async fn remove<C: ConnectionTrait>(db: &C, user_id: i32, site_key: &str, video_id: &str) -> Result<u64, DbErr> {
    let result = FavoriteEntity::delete_many()
        .filter(favorites::Column::UserId.eq(user_id))
        .filter(favorites::Column::SiteKey.eq(site_key))
        .filter(favorites::Column::VideoId.eq(video_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub async fn insert<C: ConnectionTrait>(db: &C, user_id: i32, item: NewFavorite, now: i64) -> Result<(), DbErr> {
    favorites::ActiveModel {
        user_id: Set(user_id),
        site_key: Set(item.site_key),
        site_name: Set(item.site_name),
        spider_api: Set(item.spider_api),
        video_id: Set(item.video_id),
        video_title: Set(item.video_title),
        video_poster: Set(item.video_poster),
        video_remark: Set(item.video_remark),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}
