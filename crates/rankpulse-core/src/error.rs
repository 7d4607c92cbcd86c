use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid range: {0} (expected one of 7d, 30d, 90d, 1y, 16m)")]
    InvalidRange(String),

    #[error("invalid {field} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str },

    #[error("end_date must be on or after start_date")]
    InvertedWindow,

    #[error("date window is outside the supported calendar range")]
    WindowOutOfRange,

    #[error("unknown intent: {0}")]
    UnknownIntent(String),

    #[error("invalid {field}: {value}")]
    InvalidSort { field: &'static str, value: String },

    #[error("row {index}: {reason}")]
    InvalidSyncRow { index: usize, reason: &'static str },

    #[error("keyword must not be empty")]
    EmptyKeyword,
}
