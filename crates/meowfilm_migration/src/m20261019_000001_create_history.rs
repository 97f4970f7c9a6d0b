use sea_orm_migration::prelude::*;

use crate::m20260301_000002_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SearchHistory::UserId).integer().not_null())
                    .col(ColumnDef::new(SearchHistory::Keyword).text().not_null())
                    .col(ColumnDef::new(SearchHistory::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_search_history_user_id")
                            .from(SearchHistory::Table, SearchHistory::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_search_history_user_id_keyword")
                    .table(SearchHistory::Table)
                    .col(SearchHistory::UserId)
                    .col(SearchHistory::Keyword)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_search_history_user_id_updated_at")
                    .table(SearchHistory::Table)
                    .col(SearchHistory::UserId)
                    .col(SearchHistory::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlayHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlayHistory::UserId).integer().not_null())
                    .col(ColumnDef::new(PlayHistory::SiteKey).text().not_null())
                    .col(ColumnDef::new(PlayHistory::SiteName).text().not_null().default(""))
                    .col(ColumnDef::new(PlayHistory::SpiderApi).text().not_null())
                    .col(ColumnDef::new(PlayHistory::VideoId).text().not_null())
                    .col(ColumnDef::new(PlayHistory::VideoTitle).text().not_null())
                    .col(ColumnDef::new(PlayHistory::VideoPoster).text().not_null().default(""))
                    .col(ColumnDef::new(PlayHistory::VideoRemark).text().not_null().default(""))
                    .col(ColumnDef::new(PlayHistory::PanLabel).text().not_null().default(""))
                    .col(ColumnDef::new(PlayHistory::PlayFlag).text().not_null().default(""))
                    .col(ColumnDef::new(PlayHistory::ContentKey).text().not_null().default(""))
                    .col(ColumnDef::new(PlayHistory::EpisodeIndex).integer().not_null().default(0))
                    .col(ColumnDef::new(PlayHistory::EpisodeName).text().not_null().default(""))
                    .col(ColumnDef::new(PlayHistory::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_play_history_user_id")
                            .from(PlayHistory::Table, PlayHistory::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_play_history_user_site_video")
                    .table(PlayHistory::Table)
                    .col(PlayHistory::UserId)
                    .col(PlayHistory::SiteKey)
                    .col(PlayHistory::VideoId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_play_history_user_id_updated_at")
                    .table(PlayHistory::Table)
                    .col(PlayHistory::UserId)
                    .col(PlayHistory::UpdatedAt)
                    .to_owned(),
            )
            .await?;
        // 写入时按内容键查找同一部影片的旧记录
        manager
            .create_index(
                Index::create()
                    .name("idx_play_history_user_id_content_key")
                    .table(PlayHistory::Table)
                    .col(PlayHistory::UserId)
                    .col(PlayHistory::ContentKey)
                    .col(PlayHistory::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Favorites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Favorites::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Favorites::UserId).integer().not_null())
                    .col(ColumnDef::new(Favorites::SiteKey).text().not_null())
                    .col(ColumnDef::new(Favorites::SiteName).text().not_null().default(""))
                    .col(ColumnDef::new(Favorites::SpiderApi).text().not_null())
                    .col(ColumnDef::new(Favorites::VideoId).text().not_null())
                    .col(ColumnDef::new(Favorites::VideoTitle).text().not_null())
                    .col(ColumnDef::new(Favorites::VideoPoster).text().not_null().default(""))
                    .col(ColumnDef::new(Favorites::VideoRemark).text().not_null().default(""))
                    .col(ColumnDef::new(Favorites::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_user_id")
                            .from(Favorites::Table, Favorites::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_favorites_user_site_video")
                    .table(Favorites::Table)
                    .col(Favorites::UserId)
                    .col(Favorites::SiteKey)
                    .col(Favorites::VideoId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_favorites_user_id_updated_at")
                    .table(Favorites::Table)
                    .col(Favorites::UserId)
                    .col(Favorites::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Favorites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SearchHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SearchHistory {
    Table,
    Id,
    UserId,
    Keyword,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PlayHistory {
    Table,
    Id,
    UserId,
    SiteKey,
    SiteName,
    SpiderApi,
    VideoId,
    VideoTitle,
    VideoPoster,
    VideoRemark,
    PanLabel,
    PlayFlag,
    ContentKey,
    EpisodeIndex,
    EpisodeName,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Favorites {
    Table,
    Id,
    UserId,
    SiteKey,
    SiteName,
    SpiderApi,
    VideoId,
    VideoTitle,
    VideoPoster,
    VideoRemark,
    UpdatedAt,
}
