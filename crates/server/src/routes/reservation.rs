use crate::{
    dtos::page::Page,
    error::AppError,
    routes::fail_to,
    session::{self, ReservationDraft},
    state::AppState,
};
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use database::{
    db::with_timeout,
    error::ServiceError,
    services::{NewReservation, ReservationService, ReservationWithRoom, RoomService},
};
use log::{error, warn};
use models::{
    date_range::{DATE_FORMAT, DateRange},
    forms,
    mail::BookingNotice,
};
use std::collections::HashMap;
use tower_sessions::Session;

/// The reservation form, for the dates and room chosen earlier in the session
pub async fn make_reservation(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let Some(mut draft) = session::draft(&session).await? else {
        return fail_to(&session, "Can't get reservation from session", "/").await;
    };

    let Some(room_id) = draft.room_id else {
        return fail_to(&session, "Can't get reservation from session", "/").await;
    };

    let room = match with_timeout(RoomService::get(&state.db, room_id)).await {
        Ok(room) => room,
        Err(e) => {
            warn!("Can't resolve room {room_id}: {e}");
            return fail_to(&session, "Can't find room with given id", "/").await;
        }
    };

    draft.room_name = Some(room.room_name);
    session::set_draft(&session, &draft).await?;

    Page::new("make-reservation.page")
        .string("start_date", draft.stay.start().format(DATE_FORMAT).to_string())
        .string("end_date", draft.stay.end().format(DATE_FORMAT).to_string())
        .data("reservation", &draft)
        .render(&session)
        .await
}

/// Validates the reservation form and books the room
pub async fn post_make_reservation(
    State(state): State<AppState>,
    session: Session,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let mut form = forms::Form::new(fields);

    let Ok(stay) = DateRange::parse(form.trimmed("start_date"), form.trimmed("end_date")) else {
        return fail_to(&session, "Can't parse dates", "/").await;
    };

    let Ok(room_id) = form.trimmed("room_id").parse::<i32>() else {
        return fail_to(&session, "Invalid room id", "/").await;
    };

    let room = match with_timeout(RoomService::get(&state.db, room_id)).await {
        Ok(room) => room,
        Err(e) => {
            warn!("Can't resolve room {room_id}: {e}");
            return fail_to(&session, "Can't find room with given id", "/").await;
        }
    };

    form.required(&["first_name", "last_name", "email"]);
    form.min_length("first_name", 2);
    form.is_email("email");

    if !form.is_valid() {
        let draft = ReservationDraft {
            stay,
            room_id: Some(room.id),
            room_name: Some(room.room_name),
        };

        return Page::new("make-reservation.page")
            .string("start_date", form.get("start_date"))
            .string("end_date", form.get("end_date"))
            .data("reservation", &draft)
            .form(form)
            .render(&session)
            .await;
    }

    let new = NewReservation {
        first_name: form.trimmed("first_name").to_owned(),
        last_name: form.trimmed("last_name").to_owned(),
        email: form.trimmed("email").to_owned(),
        phone: form.trimmed("phone").to_owned(),
        room_id: room.id,
        stay,
    };

    let (reservation, booked_room) =
        match with_timeout(ReservationService::create(&state.db, new)).await {
            Ok(created) => created,
            Err(ServiceError::Unavailable) => {
                return fail_to(
                    &session,
                    "This room is no longer available for the selected dates",
                    "/search-availability",
                )
                .await;
            }
            Err(e) => {
                error!("Failed to book room {}: {e}", room.id);
                return fail_to(&session, "Can't insert reservation into the database", "/").await;
            }
        };

    let notice = BookingNotice {
        guest_first_name: &reservation.first_name,
        guest_last_name: &reservation.last_name,
        guest_email: &reservation.email,
        room_name: &booked_room.room_name,
        stay,
    };
    state
        .mailer
        .send(notice.guest_confirmation(&state.config.mail_from));
    state
        .mailer
        .send(notice.owner_notification(&state.config.owner_email));

    let booked = ReservationWithRoom {
        reservation,
        room_name: booked_room.room_name,
    };
    session::set_booked(&session, &booked).await?;

    Ok(Redirect::to("/reservation-summary").into_response())
}

/// Shows a booking once, right after it was made
pub async fn reservation_summary(session: Session) -> Result<Response, AppError> {
    let Some(booked) = session::take_booked(&session).await? else {
        return fail_to(&session, "Can't get reservation from session", "/").await;
    };

    Page::new("reservation-summary.page")
        .string(
            "start_date",
            booked.reservation.start_date.format(DATE_FORMAT).to_string(),
        )
        .string(
            "end_date",
            booked.reservation.end_date.format(DATE_FORMAT).to_string(),
        )
        .data("reservation", &booked)
        .render(&session)
        .await
}
