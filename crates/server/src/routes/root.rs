use crate::{dtos::page::Page, error::AppError};
use axum::response::Response;
use tower_sessions::Session;

/// Home page
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Home page payload", content_type = "application/json")
    ),
    tag = "Pages"
)]
pub async fn root(session: Session) -> Result<Response, AppError> {
    Page::new("home.page").render(&session).await
}
