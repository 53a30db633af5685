use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Shared(#[from] shared::Error),
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
    /// `json` picks a 401 body over a redirect to the login page.
    #[error("authentication required")]
    Unauthorized { json: bool },
    #[error("{0}")]
    BadRequest(String),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Shared(shared::Error::Validation(_)) | WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Shared(shared::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            WebError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            WebError::Shared(_) | WebError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if let WebError::Unauthorized { json: false } = self {
            return Redirect::to("/login").into_response();
        }
        let status = self.status();
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        match self {
            WebError::Template(_) => (status, Html(message)).into_response(),
            _ => (status, Json(json!({ "error": message }))).into_response(),
        }
    }
}

pub type WebResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn page_requests_redirect_to_login() {
        let response = WebError::Unauthorized { json: false }.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/login");
    }

    #[test]
    fn api_requests_get_401() {
        let response = WebError::Unauthorized { json: true }.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn validation_is_bad_request() {
        let err = WebError::from(shared::Error::Validation("widget name".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
