use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

/// 全新数据库写入的默认设置
const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("site_name", "MeowFilm"),
    ("video_source_sites", "[]"),
    ("video_source_site_status", "{}"),
    ("video_source_site_home", "{}"),
    ("video_source_site_search", "{}"),
    ("video_source_site_order", "[]"),
    ("video_source_site_availability", "{}"),
    ("video_source_site_error", "{}"),
    ("video_source_search_order", "[]"),
    ("video_source_search_cover_site", ""),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Settings::Key).text().not_null().primary_key())
                    .col(ColumnDef::new(Settings::Value).text().null())
                    .to_owned(),
            )
            .await?;

        // 已存在的键不覆盖
        let db = manager.get_connection();
        for (key, value) in DEFAULT_SETTINGS {
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
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Settings {
    Table,
    Key,
    Value,
}
