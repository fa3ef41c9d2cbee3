use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid query: {0}")]
    BadQuery(#[from] QueryRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadQuery { .. } => StatusCode::BAD_REQUEST,
        };
        warn!(%status, "{self}");

        (status, self.to_string()).into_response()
    }
}
