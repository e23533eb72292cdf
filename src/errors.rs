use axum::http::StatusCode;
use chrono::NaiveDate;
use thiserror::Error;

/// A record that could not be turned into a normalized habit or check-in, or
/// a date the calendar cannot build a period around.
///
/// Record errors are recovered locally: the offending record is skipped or the
/// habit's streaks fall back to zero, and the rest of the collection is
/// processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("malformed date {0:?}")]
    MalformedDate(String),

    #[error("unknown check-in status {0:?}")]
    UnknownStatus(String),

    #[error("weekday index {0} is outside 0..=6")]
    InvalidWeekday(i64),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("no calendar period around {0}")]
    DateOutOfRange(NaiveDate),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
