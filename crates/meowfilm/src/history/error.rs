use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("搜索关键词不能为空")]
    KeywordRequired,
    #[error("参数不完整")]
    IncompleteRecord,
    #[error("参数无效")]
    InvalidParams,
}
