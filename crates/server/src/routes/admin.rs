use crate::{
    dtos::page::Page,
    error::AppError,
    routes::{fail_to, succeed_to},
    state::AppState,
};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use database::{
    db::with_timeout,
    error::ServiceError,
    services::{GuestDetails, ReservationService},
};
use models::{forms, source::ListSource};
use serde::Deserialize;
use std::collections::HashMap;
use tower_sessions::Session;

const DASHBOARD: &str = "/admin/dashboard";

/// Calendar month the admin came from, if any
#[derive(Debug, Default, Deserialize)]
pub struct ReturnQuery {
    pub y: Option<String>,
    pub m: Option<String>,
}

impl ReturnQuery {
    fn path(&self, src: ListSource) -> String {
        src.return_path(self.y.as_deref(), self.m.as_deref())
    }
}

/// Reads the `{src}/{id}` pair of an admin reservation link
fn parse_target(src: &str, id: &str) -> Option<(ListSource, i32)> {
    Some((src.parse().ok()?, id.parse().ok()?))
}

pub async fn dashboard(session: Session) -> Result<Response, AppError> {
    Page::new("admin-dashboard.page").render(&session).await
}

pub async fn new_reservations(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let reservations = with_timeout(ReservationService::unprocessed(&state.db)).await?;

    Page::new("admin-new-reservations.page")
        .data("reservations", &reservations)
        .render(&session)
        .await
}

pub async fn all_reservations(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let reservations = with_timeout(ReservationService::all(&state.db)).await?;

    Page::new("admin-all-reservations.page")
        .data("reservations", &reservations)
        .render(&session)
        .await
}

/// One reservation with its guest edit form
pub async fn show_reservation(
    State(state): State<AppState>,
    session: Session,
    Path((src, id)): Path<(String, String)>,
    Query(query): Query<ReturnQuery>,
) -> Result<Response, AppError> {
    let Some((src, id)) = parse_target(&src, &id) else {
        return fail_to(&session, "Invalid reservation link", DASHBOARD).await;
    };

    let reservation = match with_timeout(ReservationService::get(&state.db, id)).await {
        Ok(reservation) => reservation,
        Err(ServiceError::NotFound { .. }) => {
            return fail_to(&session, "Reservation not found", &query.path(src)).await;
        }
        Err(e) => return Err(e.into()),
    };

    Page::new("admin-reservations-show.page")
        .string("src", src.to_string())
        .string("month", query.m.unwrap_or_default())
        .string("year", query.y.unwrap_or_default())
        .data("reservation", &reservation)
        .render(&session)
        .await
}

/// Saves the guest fields of a reservation
pub async fn post_show_reservation(
    State(state): State<AppState>,
    session: Session,
    Path((src, id)): Path<(String, String)>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let Some((src, id)) = parse_target(&src, &id) else {
        return fail_to(&session, "Invalid reservation link", DASHBOARD).await;
    };

    let mut form = forms::Form::new(fields);
    let back = ReturnQuery {
        y: Some(form.trimmed("y").to_owned()),
        m: Some(form.trimmed("m").to_owned()),
    }
    .path(src);

    form.required(&["first_name", "last_name", "email", "phone"]);
    form.min_length("first_name", 2);
    form.min_length("last_name", 2);
    form.is_email("email");

    if !form.is_valid() {
        let reservation = match with_timeout(ReservationService::get(&state.db, id)).await {
            Ok(reservation) => reservation,
            Err(ServiceError::NotFound { .. }) => {
                return fail_to(&session, "Reservation not found", &back).await;
            }
            Err(e) => return Err(e.into()),
        };

        return Page::new("admin-reservations-show.page")
            .string("src", src.to_string())
            .string("month", form.trimmed("m"))
            .string("year", form.trimmed("y"))
            .data("reservation", &reservation)
            .form(form)
            .render(&session)
            .await;
    }

    let details = GuestDetails {
        first_name: form.trimmed("first_name").to_owned(),
        last_name: form.trimmed("last_name").to_owned(),
        email: form.trimmed("email").to_owned(),
        phone: form.trimmed("phone").to_owned(),
    };

    match with_timeout(ReservationService::update_guest(&state.db, id, details)).await {
        Ok(_) => succeed_to(&session, "Reservation updated", &back).await,
        Err(ServiceError::NotFound { .. }) => {
            fail_to(&session, "Reservation not found", &back).await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn process_reservation(
    State(state): State<AppState>,
    session: Session,
    Path((src, id)): Path<(String, String)>,
    Query(query): Query<ReturnQuery>,
) -> Result<Response, AppError> {
    let Some((src, id)) = parse_target(&src, &id) else {
        return fail_to(&session, "Invalid reservation link", DASHBOARD).await;
    };
    let back = query.path(src);

    match with_timeout(ReservationService::mark_processed(&state.db, id)).await {
        Ok(()) => succeed_to(&session, "Reservation marked as processed", &back).await,
        Err(ServiceError::NotFound { .. }) => {
            fail_to(&session, "Reservation not found", &back).await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_reservation(
    State(state): State<AppState>,
    session: Session,
    Path((src, id)): Path<(String, String)>,
    Query(query): Query<ReturnQuery>,
) -> Result<Response, AppError> {
    let Some((src, id)) = parse_target(&src, &id) else {
        return fail_to(&session, "Invalid reservation link", DASHBOARD).await;
    };
    let back = query.path(src);

    match with_timeout(ReservationService::delete(&state.db, id)).await {
        Ok(()) => succeed_to(&session, "Reservation deleted", &back).await,
        Err(ServiceError::NotFound { .. }) => {
            fail_to(&session, "Reservation not found", &back).await
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod test {
    use super::{ReturnQuery, parse_target};
    use models::source::ListSource;

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("new", "4"), Some((ListSource::New, 4)));
        assert_eq!(parse_target("calendar", "12"), Some((ListSource::Calendar, 12)));
        assert_eq!(parse_target("old", "4"), None);
        assert_eq!(parse_target("all", "four"), None);
    }

    #[test]
    fn test_return_query_path() {
        let query = ReturnQuery {
            y: Some("2050".to_string()),
            m: Some("02".to_string()),
        };
        assert_eq!(
            query.path(ListSource::New),
            "/admin/reservations-calendar?y=2050&m=02"
        );
        assert_eq!(
            ReturnQuery::default().path(ListSource::All),
            "/admin/all-reservations"
        );
    }
}
