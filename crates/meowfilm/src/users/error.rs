use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("用户名不能为空")]
    EmptyUsername,
    #[error("添加用户失败，可能是用户名已存在或参数无效")]
    AddFailed,
    #[error("用户不存在")]
    NotFound,
    #[error("操作失败")]
    BanFailed,
    #[error("删除失败")]
    DeleteFailed,
    #[error("未提供修改内容")]
    NothingToUpdate,
    #[error("用户名已存在或不合法")]
    UsernameTaken,
    #[error("管理员角色不可修改")]
    AdminRoleImmutable,
    #[error("角色无效")]
    InvalidRole,
    #[error("CatPawOpen 接口地址不是合法 URL")]
    InvalidApiBase,
    #[error("CatPawOpen 接口地址未设置")]
    ApiBaseRequired,
    #[error("搜索线程数必须是 1-50 的整数")]
    InvalidThreadCount,
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}
