use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

/// 站点名称之外的站点设置默认值
const SITE_SETTINGS: &[(&str, &str)] = &[
    ("douban_data_proxy", "direct"),
    ("douban_data_custom", ""),
    ("douban_img_proxy", "direct-browser"),
    ("douban_img_custom", ""),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for (key, value) in SITE_SETTINGS {
            let stmt = Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)",
                vec![(*key).into(), (*value).into()],
            );
            db.execute(stmt).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for (key, _) in SITE_SETTINGS {
            let stmt = Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "DELETE FROM settings WHERE key = ?",
                vec![(*key).into()],
            );
            db.execute(stmt).await?;
        }
        Ok(())
    }
}
