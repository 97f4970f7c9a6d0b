use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).text().not_null().unique_key())
                    .col(ColumnDef::new(Users::Password).text().not_null())
                    .col(ColumnDef::new(Users::Role).text().not_null().default("user"))
                    .col(ColumnDef::new(Users::Status).text().not_null().default("active"))
                    .col(ColumnDef::new(Users::CatApiBase).text().not_null().default(""))
                    .col(ColumnDef::new(Users::CatApiKey).text().not_null().default(""))
                    .col(ColumnDef::new(Users::CatProxy).text().not_null().default(""))
                    .col(ColumnDef::new(Users::SearchThreadCount).integer().not_null().default(5))
                    // 站点相关字段均以 JSON 文本保存
                    .col(ColumnDef::new(Users::CatSites).text().not_null().default("[]"))
                    .col(ColumnDef::new(Users::CatSiteStatus).text().not_null().default("{}"))
                    .col(ColumnDef::new(Users::CatSiteHome).text().not_null().default("{}"))
                    .col(ColumnDef::new(Users::CatSiteOrder).text().not_null().default("[]"))
                    .col(ColumnDef::new(Users::CatSiteAvailability).text().not_null().default("{}"))
                    .col(ColumnDef::new(Users::CatSearchOrder).text().not_null().default("[]"))
                    .col(ColumnDef::new(Users::CatSearchCoverSite).text().not_null().default(""))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Username,
    Password,
    Role,
    Status,
    CatApiBase,
    CatApiKey,
    CatProxy,
    SearchThreadCount,
    CatSites,
    CatSiteStatus,
    CatSiteHome,
    CatSiteOrder,
    CatSiteAvailability,
    CatSearchOrder,
    CatSearchCoverSite,
}
