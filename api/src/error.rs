use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use backtest::BacktestError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Shared(#[from] shared::Error),
    #[error(transparent)]
    Backtest(#[from] BacktestError),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Shared(shared::Error::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Shared(shared::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Shared(shared::Error::Upstream(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Shared(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Backtest(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(
            ApiError::from(shared::Error::NotFound("cryptocurrency 9".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(shared::Error::Validation("bad range".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(BacktestError::UnknownStrategy("magic".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(shared::Error::Config("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_the_item() {
        let err = ApiError::from(shared::Error::NotFound("cryptocurrency 9".into()));
        assert_eq!(err.to_string(), "cryptocurrency 9 not found");
    }
}
