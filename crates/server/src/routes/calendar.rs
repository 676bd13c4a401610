use crate::{
    dtos::page::Page,
    error::AppError,
    routes::{admin::ReturnQuery, fail_to, succeed_to},
    session,
    state::AppState,
};
use axum::{
    Form,
    extract::{Query, State},
    response::Response,
};
use chrono::Local;
use database::{
    db::with_timeout,
    error::ServiceError,
    services::{RestrictionService, RoomService},
};
use futures::future::try_join_all;
use models::calendar::{CalendarMonth, RoomDayMaps, reconcile};
use std::collections::HashMap;
use tower_sessions::Session;

const CALENDAR: &str = "/admin/reservations-calendar";

fn calendar_path(month: &CalendarMonth) -> String {
    format!(
        "/admin/reservations-calendar?y={}&m={}",
        month.year(),
        month.month()
    )
}

/// Month grid of reservations and owner blocks for every room.
///
/// The block maps drawn here are kept in the session; the next submission is diffed
/// against them.
pub async fn reservations_calendar(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ReturnQuery>,
) -> Result<Response, AppError> {
    let month = match CalendarMonth::from_query(
        query.y.as_deref(),
        query.m.as_deref(),
        Local::now().date_naive(),
    ) {
        Ok(month) => month,
        Err(e) => return fail_to(&session, &e.to_string(), CALENDAR).await,
    };

    let rooms = with_timeout(RoomService::all(&state.db)).await?;
    let occupancies = try_join_all(rooms.iter().map(|room| {
        with_timeout(RestrictionService::for_room_in_month(
            &state.db, room.id, &month,
        ))
    }))
    .await?;

    let next = month.next();
    let previous = month.previous();

    let mut page = Page::new("admin-reservations-calendar.page")
        .string("current_month", month.month_str())
        .string("current_month_year", month.year_str())
        .string("next_month", next.month_str())
        .string("next_month_year", next.year_str())
        .string("last_month", previous.month_str())
        .string("last_month_year", previous.year_str())
        .int("days_in_month", i64::from(month.days_in_month()))
        .data("current_date", month.first_day())
        .data("rooms", &rooms);

    for (room, occupancies) in rooms.iter().zip(&occupancies) {
        let maps = RoomDayMaps::build(&month, occupancies);
        session::store_block_map(&session, room.id, &maps.blocks).await?;

        page = page
            .data(&format!("reservation_map_{}", room.id), &maps.reservations)
            .data(&format!("block_map_{}", room.id), &maps.blocks);
    }

    page.render(&session).await
}

/// Applies the owner-block edits of a calendar submission
pub async fn post_reservations_calendar(
    State(state): State<AppState>,
    session: Session,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let year = fields.get("y").map(|y| y.trim()).unwrap_or_default();
    if year.is_empty() {
        return fail_to(&session, "Missing year", CALENDAR).await;
    }

    let month = match CalendarMonth::from_query(
        Some(year),
        fields.get("m").map(String::as_str),
        Local::now().date_naive(),
    ) {
        Ok(month) => month,
        Err(e) => return fail_to(&session, &e.to_string(), CALENDAR).await,
    };
    let back = calendar_path(&month);

    let rooms = with_timeout(RoomService::all(&state.db)).await?;
    let room_ids: Vec<i32> = rooms.iter().map(|room| room.id).collect();
    let snapshots = session::block_maps(&session, room_ids).await?;

    let submitted = fields
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()));
    let edits = match reconcile(&snapshots, submitted) {
        Ok(edits) => edits,
        Err(e) => return fail_to(&session, &e.to_string(), &back).await,
    };

    match with_timeout(RestrictionService::apply_block_edits(&state.db, &edits)).await {
        Ok(()) => succeed_to(&session, "Changes saved", &back).await,
        Err(ServiceError::Unavailable) => {
            fail_to(
                &session,
                "A new block overlaps an existing reservation, nothing was saved",
                &back,
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}
