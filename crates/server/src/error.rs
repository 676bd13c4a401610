use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::error::ServiceError;
use log::error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Failed to serialize page: {0}")]
    Page(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Every variant is a server-side failure; the cause stays in the log
        error!("{self}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error".to_string(),
        )
            .into_response()
    }
}
