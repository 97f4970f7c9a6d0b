use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use meowfilm_entity::entities::{prelude::Setting, settings};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tokio::sync::Mutex;
use tracing::debug;

use crate::database::begin_write_transaction;

/// 全局设置的键值存储，带进程内读缓存。
///
/// 缓存按键懒加载，只在事务提交成功后更新；写入失败时缓存保持上一次提交的值。
/// 读路径只在缓存缺失时填充，不会覆盖写路径放入的新值。
pub struct SettingsStore {
    db: Arc<DatabaseConnection>,
    cache: DashMap<String, String>,
    version: AtomicU64,
    /// 串行化写事务与提交后的缓存刷新
    writer: Mutex<()>,
}

impl SettingsStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            cache: DashMap::new(),
            version: AtomicU64::new(0),
            writer: Mutex::new(()),
        }
    }

    /// 任一设置值实际发生变化时递增
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// 读取设置，不存在时返回空字符串
    pub async fn get(&self, key: &str) -> Result<String> {
        if let Some(value) = self.cache.get(key) {
            return Ok(value.clone());
        }
        let value = Setting::find_by_id(key.to_string())
            .one(self.db.as_ref())
            .await
            .with_context(|| format!("读取设置 {} 失败", key))?
            .and_then(|row| row.value)
            .unwrap_or_default();
        debug!("设置 {} 已加载到缓存", key);
        Ok(self.fill_cache(key, value))
    }

    /// 缓存缺失时填入读到的值；期间已有写入提交时以缓存中的值为准
    fn fill_cache(&self, key: &str, value: String) -> String {
        self.cache.entry(key.to_string()).or_insert(value).clone()
    }

    /// 写入单个设置，返回值是否发生变化
    pub async fn set(&self, key: &str, value: impl Into<String>) -> Result<bool> {
        let value = value.into();
        let before = self.version();
        self.update(&[key], |batch| {
            batch.set(key, value);
            Ok(())
        })
        .await?;
        Ok(self.version() != before)
    }

    /// 在一个写事务中读取 `keys` 的最新值，交给 `f` 计算需要写入的值并提交。
    ///
    /// `f` 返回错误时事务回滚，不写入任何值。
    pub async fn update<T, F>(&self, keys: &[&str], f: F) -> Result<T>
    where
        F: FnOnce(&mut SettingsBatch) -> Result<T>,
    {
        let _writer = self.writer.lock().await;
        let txn = begin_write_transaction(&self.db).await?;
        let rows = Setting::find()
            .filter(settings::Column::Key.is_in(keys.iter().copied()))
            .all(&txn)
            .await
            .context("读取设置失败")?;
        let mut batch = SettingsBatch::new(keys, rows);

        let result = f(&mut batch)?;

        for (key, value) in &batch.changes {
            upsert_setting(&txn, key, value)
                .await
                .with_context(|| format!("写入设置 {} 失败", key))?;
        }
        txn.commit().await.context("提交设置失败")?;

        let changed = !batch.changes.is_empty();
        let SettingsBatch { values, changes } = batch;
        for (key, value) in values.into_iter().chain(changes) {
            self.cache.insert(key, value);
        }
        if changed {
            self.version.fetch_add(1, Ordering::AcqRel);
        } else {
            debug!("设置未发生变化，跳过写入");
        }
        Ok(result)
    }
}

async fn upsert_setting<C: ConnectionTrait>(db: &C, key: &str, value: &str) -> Result<()> {
    let model = settings::ActiveModel {
        key: Set(key.to_string()),
        value: Set(Some(value.to_string())),
    };
    Setting::insert(model)
        .on_conflict(
            OnConflict::column(settings::Column::Key)
                .update_column(settings::Column::Value)
                .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}

/// 一次设置事务中读取到的值与待写入的值
pub struct SettingsBatch {
    values: HashMap<String, String>,
    changes: BTreeMap<String, String>,
}

impl SettingsBatch {
    fn new(keys: &[&str], rows: Vec<settings::Model>) -> Self {
        let mut values: HashMap<String, String> = keys.iter().map(|k| (k.to_string(), String::new())).collect();
        for row in rows {
            values.insert(row.key, row.value.unwrap_or_default());
        }
        Self {
            values,
            changes: BTreeMap::new(),
        }
    }

    /// 读取值，已在本批次中修改的返回修改后的值
    pub fn get(&self, key: &str) -> &str {
        self.changes
            .get(key)
            .or_else(|| self.values.get(key))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// 与数据库中的值相同时不会产生写入
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if self.values.get(key).map(String::as_str).unwrap_or_default() == value {
            self.changes.remove(key);
        } else {
            self.changes.insert(key.to_string(), value);
        }
    }
}
