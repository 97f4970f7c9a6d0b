use std::collections::HashSet;

use meowfilm_entity::entities::{play_history, prelude::PlayHistory};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::Serialize;
use utoipa::ToSchema;

/// 网盘播放产生的记录不进入播放历史
const NET_DISK_SUFFIX: &str = "######wodepan";

/// 播放历史中的一条记录
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayRecord {
    pub content_key: String,
    pub site_key: String,
    pub site_name: String,
    pub spider_api: String,
    pub video_id: String,
    pub video_title: String,
    pub video_poster: String,
    pub video_remark: String,
    pub pan_label: String,
    pub play_flag: String,
    pub episode_index: i32,
    pub episode_name: String,
    pub updated_at: i64,
}

impl From<play_history::Model> for PlayRecord {
    fn from(row: play_history::Model) -> Self {
        let content_key = match row.content_key.trim() {
            "" => content_key(&row.video_title),
            key => key.to_string(),
        };
        Self {
            content_key,
            site_key: row.site_key,
            site_name: row.site_name,
            spider_api: row.spider_api,
            video_id: row.video_id,
            video_title: row.video_title,
            video_poster: row.video_poster,
            video_remark: row.video_remark,
            pan_label: row.pan_label,
            play_flag: row.play_flag,
            episode_index: row.episode_index,
            episode_name: row.episode_name,
            updated_at: row.updated_at,
        }
    }
}

/// 一次播放上报，字符串均已去除首尾空白
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPlayRecord {
    pub site_key: String,
    pub site_name: String,
    pub spider_api: String,
    pub video_id: String,
    pub video_title: String,
    pub video_poster: String,
    pub video_remark: String,
    pub pan_label: String,
    pub play_flag: String,
    pub episode_index: i32,
    pub episode_name: String,
    /// 为真时用本次上报的封面替换已锁定的封面
    pub force_poster_update: bool,
}

impl NewPlayRecord {
    pub fn is_complete(&self) -> bool {
        [&self.site_key, &self.spider_api, &self.video_id, &self.video_title]
            .iter()
            .all(|field| !field.is_empty())
    }

    /// 同一部影片跨站点共用的键，标题为空时退化为站点与视频 id
    pub fn content_key(&self) -> String {
        match content_key(&self.video_title) {
            key if key.is_empty() => format!("{}::{}", self.site_key, self.video_id),
            key => key,
        }
    }
}

/// 去除全部空白并转为小写
pub fn content_key(title: &str) -> String {
    title.split_whitespace().collect::<String>().to_lowercase()
}

pub fn is_net_disk_item(video_id: &str) -> bool {
    video_id.trim().to_lowercase().ends_with(NET_DISK_SUFFIX)
}

/// 列表接口扫描的行数上限，去重后再截取 `limit` 条
pub fn scan_limit(limit: u64) -> u64 {
    (limit * 10).clamp(50, 500)
}

/// 最近的播放记录，同一内容只保留最新的一条
pub async fn recent<C: ConnectionTrait>(db: &C, user_id: i32, limit: u64) -> Result<Vec<PlayRecord>, DbErr> {
    let rows = PlayHistory::find()
        .filter(play_history::Column::UserId.eq(user_id))
        .order_by_desc(play_history::Column::UpdatedAt)
        .order_by_desc(play_history::Column::Id)
        .limit(scan_limit(limit))
        .all(db)
        .await?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for row in rows {
        if is_net_disk_item(&row.video_id) {
            continue;
        }
        let record = PlayRecord::from(row);
        let key = if record.content_key.is_empty() {
            format!("{}::{}", record.site_key, record.video_id)
        } else {
            record.content_key.clone()
        };
        if !seen.insert(key) {
            continue;
        }
        out.push(record);
        if out.len() as u64 >= limit {
            break;
        }
    }
    Ok(out)
}

pub async fn find_one<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    site_key: &str,
    video_id: &str,
) -> Result<Option<PlayRecord>, DbErr> {
    if is_net_disk_item(video_id) {
        return Ok(None);
    }
    let row = PlayHistory::find()
        .filter(play_history::Column::UserId.eq(user_id))
        .filter(play_history::Column::SiteKey.eq(site_key))
        .filter(play_history::Column::VideoId.eq(video_id))
        .order_by_desc(play_history::Column::UpdatedAt)
        .one(db)
        .await?;
    Ok(row.map(PlayRecord::from))
}

/// 同一内容最近一次非空的封面
async fn locked_poster<C: ConnectionTrait>(db: &C, user_id: i32, content_key: &str) -> Result<Option<String>, DbErr> {
    let row = PlayHistory::find()
        .filter(play_history::Column::UserId.eq(user_id))
        .filter(play_history::Column::ContentKey.eq(content_key))
        .filter(play_history::Column::VideoPoster.ne(""))
        .order_by_desc(play_history::Column::UpdatedAt)
        .order_by_desc(play_history::Column::Id)
        .one(db)
        .await?;
    Ok(row
        .map(|row| row.video_poster.trim().to_string())
        .filter(|poster| !poster.is_empty()))
}

/// 写入播放记录：同一内容只保留最近播放的站点，封面默认沿用先前锁定的那张
pub async fn upsert<C: ConnectionTrait>(db: &C, user_id: i32, record: NewPlayRecord, now: i64) -> Result<(), DbErr> {
    let content_key = record.content_key();
    let locked = locked_poster(db, user_id, &content_key).await?;
    let poster = match locked {
        Some(locked) if !record.force_poster_update || record.video_poster.is_empty() => locked,
        _ => record.video_poster,
    };

    PlayHistory::delete_many()
        .filter(play_history::Column::UserId.eq(user_id))
        .filter(
            play_history::Column::ContentKey
                .eq(content_key.as_str())
                .or(play_history::Column::VideoTitle.eq(record.video_title.as_str())),
        )
        .exec(db)
        .await?;

    let model = play_history::ActiveModel {
        user_id: Set(user_id),
        site_key: Set(record.site_key),
        site_name: Set(record.site_name),
        spider_api: Set(record.spider_api),
        video_id: Set(record.video_id),
        video_title: Set(record.video_title),
        video_poster: Set(poster),
        video_remark: Set(record.video_remark),
        pan_label: Set(record.pan_label),
        play_flag: Set(record.play_flag),
        content_key: Set(content_key),
        episode_index: Set(record.episode_index.max(0)),
        episode_name: Set(record.episode_name),
        updated_at: Set(now),
        ..Default::default()
    };
    PlayHistory::insert(model)
        .on_conflict(
            OnConflict::columns([
                play_history::Column::UserId,
                play_history::Column::SiteKey,
                play_history::Column::VideoId,
            ])
            .update_columns([
                play_history::Column::ContentKey,
                play_history::Column::SiteName,
                play_history::Column::SpiderApi,
                play_history::Column::VideoTitle,
                play_history::Column::VideoPoster,
                play_history::Column::VideoRemark,
                play_history::Column::PanLabel,
                play_history::Column::PlayFlag,
                play_history::Column::EpisodeIndex,
                play_history::Column::EpisodeName,
                play_history::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}
