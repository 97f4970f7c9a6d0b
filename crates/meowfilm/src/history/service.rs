use std::sync::Arc;

use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;
use tracing::debug;

use super::error::HistoryError;
use super::favorite::{self, Favorite, NewFavorite};
use super::play::{self, NewPlayRecord, PlayRecord};
use super::search::{self, normalize_keyword};
use crate::database::begin_write_transaction;

pub const PLAY_HISTORY_DEFAULT_LIMIT: u64 = 20;
const PLAY_HISTORY_MAX_LIMIT: u64 = 50;
pub const FAVORITES_DEFAULT_LIMIT: u64 = 200;
const FAVORITES_MAX_LIMIT: u64 = 200;

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// 按用户隔离的搜索历史、播放历史与收藏
#[derive(Clone)]
pub struct HistoryService {
    db: Arc<DatabaseConnection>,
}

impl HistoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn search_keywords(&self, user_id: i32) -> Result<Vec<String>> {
        search::recent_keywords(self.db.as_ref(), user_id)
            .await
            .context("读取搜索历史失败")
    }

    /// 记录关键词并返回最新的历史列表
    pub async fn record_search(&self, user_id: i32, keyword: &str) -> Result<Vec<String>> {
        let keyword = normalize_keyword(keyword);
        if keyword.is_empty() {
            return Err(HistoryError::KeywordRequired.into());
        }
        let txn = begin_write_transaction(&self.db).await?;
        search::touch_keyword(&txn, user_id, &keyword, now()).await?;
        let list = search::recent_keywords(&txn, user_id).await?;
        txn.commit().await.context("提交搜索历史失败")?;
        Ok(list)
    }

    /// 删除一个关键词；关键词为空时清空全部
    pub async fn clear_search(&self, user_id: i32, keyword: Option<&str>) -> Result<Vec<String>> {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        let txn = begin_write_transaction(&self.db).await?;
        let removed = search::remove_keyword(&txn, user_id, keyword).await?;
        let list = search::recent_keywords(&txn, user_id).await?;
        txn.commit().await.context("提交搜索历史失败")?;
        debug!("用户 {} 删除了 {} 条搜索历史", user_id, removed);
        Ok(list)
    }

    pub async fn play_history(&self, user_id: i32, limit: u64) -> Result<Vec<PlayRecord>> {
        let limit = limit.clamp(1, PLAY_HISTORY_MAX_LIMIT);
        play::recent(self.db.as_ref(), user_id, limit)
            .await
            .context("读取播放历史失败")
    }

    pub async fn play_record(&self, user_id: i32, site_key: &str, video_id: &str) -> Result<Option<PlayRecord>> {
        let (site_key, video_id) = (site_key.trim(), video_id.trim());
        if site_key.is_empty() || video_id.is_empty() {
            return Err(HistoryError::InvalidParams.into());
        }
        play::find_one(self.db.as_ref(), user_id, site_key, video_id)
            .await
            .context("读取播放记录失败")
    }

    /// 上报一次播放，返回是否写入（网盘播放不记录）
    pub async fn record_play(&self, user_id: i32, record: NewPlayRecord) -> Result<bool> {
        if !record.is_complete() {
            return Err(HistoryError::IncompleteRecord.into());
        }
        if play::is_net_disk_item(&record.video_id) {
            debug!("跳过网盘播放记录 {}", record.video_id);
            return Ok(false);
        }
        let txn = begin_write_transaction(&self.db).await?;
        play::upsert(&txn, user_id, record, now()).await?;
        txn.commit().await.context("提交播放记录失败")?;
        Ok(true)
    }

    pub async fn favorites(&self, user_id: i32, limit: u64) -> Result<Vec<Favorite>> {
        let limit = limit.clamp(1, FAVORITES_MAX_LIMIT);
        favorite::list(self.db.as_ref(), user_id, limit)
            .await
            .context("读取收藏失败")
    }

    /// 参数不完整时视为未收藏
    pub async fn is_favorited(&self, user_id: i32, site_key: &str, video_id: &str) -> Result<bool> {
        let (site_key, video_id) = (site_key.trim(), video_id.trim());
        if site_key.is_empty() || video_id.is_empty() {
            return Ok(false);
        }
        favorite::exists(self.db.as_ref(), user_id, site_key, video_id)
            .await
            .context("读取收藏状态失败")
    }

    /// 已收藏则取消，否则加入收藏；返回切换后的状态
    pub async fn toggle_favorite(&self, user_id: i32, item: NewFavorite) -> Result<bool> {
        if !item.is_complete() {
            return Err(HistoryError::InvalidParams.into());
        }
        let txn = begin_write_transaction(&self.db).await?;
        let favorited = if favorite::exists(&txn, user_id, &item.site_key, &item.video_id).await? {
            favorite::remove(&txn, user_id, &item.site_key, &item.video_id).await?;
            false
        } else {
            favorite::insert(&txn, user_id, item, now()).await?;
            true
        };
        txn.commit().await.context("提交收藏失败")?;
        Ok(favorited)
    }
}
