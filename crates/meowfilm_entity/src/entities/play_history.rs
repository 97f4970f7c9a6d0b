use sea_orm::entity::prelude::*;

/// 播放记录，同一用户同一站点的同一视频只保留一条
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "play_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub site_key: String,
    pub site_name: String,
    pub spider_api: String,
    pub video_id: String,
    pub video_title: String,
    pub video_poster: String,
    pub video_remark: String,
    pub pan_label: String,
    pub play_flag: String,
    /// 规范化后的标题，用于跨站点合并同一部影片
    pub content_key: String,
    pub episode_index: i32,
    pub episode_name: String,
    /// 秒级时间戳
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
