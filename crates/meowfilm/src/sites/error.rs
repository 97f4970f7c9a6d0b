use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("站点不存在: {0}")]
    UnknownSite(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("需要先设置 CatPawOpen 接口地址")]
    ProviderRequired,
    #[error("用户不存在: {0}")]
    UserNotFound(i32),
    #[error("用户 {0} 的站点配置已被并发修改")]
    Conflict(i32),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl SiteError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
