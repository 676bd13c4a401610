use crate::{
    dtos::page::Page,
    error::AppError,
    routes::{fail_to, succeed_to},
    session::{self, keys},
    state::AppState,
};
use axum::{
    Form,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use database::{db::with_timeout, error::ServiceError, services::UserService};
use log::info;
use models::forms;
use std::collections::HashMap;
use tower_sessions::Session;

pub async fn login(session: Session) -> Result<Response, AppError> {
    Page::new("login.page").render(&session).await
}

/// Logs a user in with email and password
pub async fn post_login(
    State(state): State<AppState>,
    session: Session,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    // A fresh id for every login attempt
    session.cycle_id().await?;

    let mut form = forms::Form::new(fields);
    form.required(&["email", "password"]);
    form.is_email("email");

    if !form.is_valid() {
        form.forget("password");
        return Page::new("login.page").form(form).render(&session).await;
    }

    let email = form.trimmed("email");
    match with_timeout(UserService::authenticate(&state.db, email, form.get("password"))).await {
        Ok(user_id) => {
            info!("User {user_id} logged in");
            session.insert(keys::USER_ID, user_id).await?;
            succeed_to(&session, "Logged in successfully", "/").await
        }
        Err(ServiceError::InvalidCredentials) => {
            fail_to(&session, "Invalid login credentials", "/user/login").await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(session: Session) -> Result<Response, AppError> {
    session.flush().await?;

    Ok(Redirect::to("/user/login").into_response())
}

/// Lets the request through only for a logged-in user
pub async fn require_auth(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if session::is_authenticated(&session).await? {
        return Ok(next.run(request).await);
    }

    fail_to(&session, "You first have to log in", "/user/login").await
}
