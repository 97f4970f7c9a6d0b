use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("用户名或密码错误")]
    InvalidCredentials,
    #[error("该账户已禁用")]
    Disabled,
    #[error("密码处理失败: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}
