pub mod admin;
pub mod auth;
pub mod availability;
pub mod calendar;
pub mod health;
pub mod reservation;
pub mod root;

use crate::{error::AppError, session};
use axum::response::{IntoResponse, Redirect, Response};
use log::warn;
use tower_sessions::Session;

/// Flashes `message` as an error and sends the user to `to`
pub(crate) async fn fail_to(
    session: &Session,
    message: &str,
    to: &str,
) -> Result<Response, AppError> {
    warn!("{message}, redirecting to {to}");
    session::error(session, message).await?;

    Ok(Redirect::to(to).into_response())
}

/// Flashes `message` as a success and sends the user to `to`
pub(crate) async fn succeed_to(
    session: &Session,
    message: &str,
    to: &str,
) -> Result<Response, AppError> {
    session::flash(session, message).await?;

    Ok(Redirect::to(to).into_response())
}
