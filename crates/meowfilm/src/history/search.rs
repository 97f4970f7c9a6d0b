use meowfilm_entity::entities::{prelude::SearchHistory, search_history};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

/// 返回给前端的关键词条数
pub const SEARCH_HISTORY_LIMIT: u64 = 20;

/// 去除首尾空白并把连续空白折叠为一个空格
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 最近使用的关键词，新的在前
pub async fn recent_keywords<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<String>, DbErr> {
    let rows = SearchHistory::find()
        .filter(search_history::Column::UserId.eq(user_id))
        .order_by_desc(search_history::Column::UpdatedAt)
        .order_by_desc(search_history::Column::Id)
        .limit(SEARCH_HISTORY_LIMIT)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| row.keyword.trim().to_string())
        .filter(|keyword| !keyword.is_empty())
        .collect())
}

/// 记录一次搜索；已有的关键词移到最前
pub async fn touch_keyword<C: ConnectionTrait>(db: &C, user_id: i32, keyword: &str, now: i64) -> Result<(), DbErr> {
    remove_keyword(db, user_id, Some(keyword)).await?;
    search_history::ActiveModel {
        user_id: Set(user_id),
        keyword: Set(keyword.to_string()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

/// 删除一个关键词，`None` 时清空该用户的全部记录
pub async fn remove_keyword<C: ConnectionTrait>(db: &C, user_id: i32, keyword: Option<&str>) -> Result<u64, DbErr> {
    let mut query = SearchHistory::delete_many().filter(search_history::Column::UserId.eq(user_id));
    if let Some(keyword) = keyword {
        query = query.filter(search_history::Column::Keyword.eq(keyword));
    }
    Ok(query.exec(db).await?.rows_affected)
}
