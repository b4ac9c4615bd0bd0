use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing or empty required field: {0}")]
    Validation(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("no engagement samples recorded for session")]
    NoData,
    #[error("store error: {0}")]
    Store(String),
    #[error("state lock poisoned")]
    StateLock,
}
