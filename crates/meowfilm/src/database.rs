use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use meowfilm_migration::{Migrator, MigratorTrait};
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sea_orm::sqlx::{self, Executor};
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, SqlxSqliteConnector, TransactionTrait};
use tracing::debug;

/// 创建 SQLite 连接选项（带所有优化配置）
fn create_sqlite_options(path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(30))
        .optimize_on_close(true, None)
        .pragma("cache_size", "-16384")
        .pragma("temp_store", "MEMORY")
        .pragma("wal_autocheckpoint", "1000")
}

async fn database_connection(path: &Path) -> Result<DatabaseConnection> {
    // 使用 after_connect 回调确保每个连接都执行额外的PRAGMA
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(3600))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("PRAGMA busy_timeout = 30000;").await?;
                conn.execute("PRAGMA journal_mode = WAL;").await?;
                conn.execute("PRAGMA synchronous = NORMAL;").await?;

                let row: (i64,) = sqlx::query_as("PRAGMA busy_timeout;").fetch_one(&mut *conn).await?;
                debug!("新数据库连接已创建，busy_timeout = {}ms", row.0);
                Ok(())
            })
        })
        .connect_with(create_sqlite_options(path))
        .await?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

async fn migrate_database(path: &Path) -> Result<()> {
    if !path.exists() {
        debug!("数据库文件不存在，将创建新的数据库");
    } else {
        debug!("检测到现有数据库文件，将在必要时应用迁移");
    }

    // 为迁移创建单连接池（避免多连接导致的迁移顺序问题）
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(create_sqlite_options(path))
        .await?;
    let connection = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());

    Migrator::up(&connection, None).await?;

    // 显式关闭连接池，确保释放所有数据库锁
    pool.close().await;
    debug!("迁移完成，已关闭迁移连接池");
    Ok(())
}

/// 进行数据库迁移并获取数据库连接
pub async fn setup_database(path: &Path) -> Result<DatabaseConnection> {
    migrate_database(path).await.context("数据库迁移失败")?;
    database_connection(path).await.context("获取数据库连接失败")
}

/// 开始一个事务并立即获取写锁
/// 通过更新锁定表来强制获取写锁，避免读后写时出现 SQLITE_BUSY_SNAPSHOT
pub async fn begin_write_transaction(connection: &DatabaseConnection) -> Result<DatabaseTransaction> {
    // 确保锁定表存在
    connection
        .execute_unprepared("CREATE TABLE IF NOT EXISTS _write_lock (id INTEGER PRIMARY KEY, ts INTEGER)")
        .await?;
    connection
        .execute_unprepared("INSERT OR IGNORE INTO _write_lock (id, ts) VALUES (1, 0)")
        .await?;

    let txn = connection.begin().await?;

    // 如果其他事务持有锁，这里会等待 busy_timeout
    txn.execute_unprepared("UPDATE _write_lock SET ts = strftime('%s', 'now') WHERE id = 1")
        .await?;

    Ok(txn)
}

/// 测试用的内存数据库，已执行全部迁移
#[cfg(test)]
pub async fn setup_memory_database() -> DatabaseConnection {
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str("sqlite::memory:").expect("解析内存数据库地址失败");
    // 内存数据库随连接销毁，必须固定为单个常驻连接
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("创建内存数据库失败");
    let connection = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
    Migrator::up(&connection, None).await.expect("内存数据库迁移失败");
    connection
}
