use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use summy_persist::PersistError;
use summy_types::SummyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Tab {0} is not connected")]
    TabNotConnected(i32),

    #[error(transparent)]
    Summy(#[from] SummyError),

    #[error("Settings storage error: {0}")]
    Persist(#[from] PersistError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TabNotConnected(_) => StatusCode::NOT_FOUND,
            ApiError::Summy(e) => match e {
                SummyError::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SummyError::Capture(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SummyError::Backend(_) | SummyError::Parse(_) => StatusCode::BAD_GATEWAY,
                SummyError::Delivery(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Persist(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::TabNotConnected(_) => "tab_not_connected",
            ApiError::Summy(e) => e.kind(),
            ApiError::Persist(_) => "storage",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
