use thiserror::Error;

#[derive(Error, Debug)]
pub enum InnerApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("无权限操作")]
    Forbidden,
    /// 业务规则拒绝，以 200 返回
    #[error("{0}")]
    Rejected(String),
}
