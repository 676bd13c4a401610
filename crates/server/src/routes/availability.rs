use crate::{
    dtos::{
        availability::{AvailabilityRequest, AvailabilityResponse},
        page::Page,
    },
    error::AppError,
    routes::fail_to,
    session::{self, ReservationDraft},
    state::AppState,
};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use database::{
    db::with_timeout,
    services::{AvailabilityService, RoomService},
};
use log::{error, warn};
use models::date_range::{DATE_FORMAT, DateRange};
use serde::Deserialize;
use tower_sessions::Session;

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct BookRoomQuery {
    id: Option<String>,
    s: Option<String>,
    e: Option<String>,
}

pub async fn search_availability(session: Session) -> Result<Response, AppError> {
    Page::new("search-availability.page").render(&session).await
}

/// Lists the rooms free for the submitted dates and remembers the dates for booking
pub async fn post_search_availability(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SearchForm>,
) -> Result<Response, AppError> {
    let Ok(stay) = DateRange::parse(form.start_date.trim(), form.end_date.trim()) else {
        return fail_to(&session, "Can't parse dates", "/").await;
    };

    let rooms = match with_timeout(AvailabilityService::available_rooms(&state.db, stay)).await {
        Ok(rooms) => rooms,
        Err(e) => {
            error!("Availability search for {stay} failed: {e}");
            return fail_to(&session, "Can't get available rooms", "/").await;
        }
    };

    if rooms.is_empty() {
        return fail_to(&session, "No availability", "/search-availability").await;
    }

    let draft = ReservationDraft {
        stay,
        room_id: None,
        room_name: None,
    };
    session::set_draft(&session, &draft).await?;

    Page::new("choose-room.page")
        .string("start_date", stay.start().format(DATE_FORMAT).to_string())
        .string("end_date", stay.end().format(DATE_FORMAT).to_string())
        .data("rooms", &rooms)
        .render(&session)
        .await
}

/// Checks a single room for the dates picked in the room page's modal
#[utoipa::path(
    post,
    path = "/search-availability-json",
    request_body(
        content = AvailabilityRequest,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, description = "Availability of the room; `ok` is false on bad input or storage failure", body = AvailabilityResponse)
    ),
    tag = "Availability"
)]
pub async fn search_availability_json(
    State(state): State<AppState>,
    Form(request): Form<AvailabilityRequest>,
) -> Json<AvailabilityResponse> {
    let stay = match DateRange::parse(request.start_date.trim(), request.end_date.trim()) {
        Ok(stay) => stay,
        Err(e) => return Json(AvailabilityResponse::failure(&request, e.to_string())),
    };

    let Ok(room_id) = request.room_id.trim().parse::<i32>() else {
        return Json(AvailabilityResponse::failure(&request, "Invalid room id"));
    };

    match with_timeout(AvailabilityService::is_room_available(&state.db, room_id, stay)).await {
        Ok(available) => Json(AvailabilityResponse {
            ok: available,
            message: String::new(),
            room_id: room_id.to_string(),
            start_date: request.start_date,
            end_date: request.end_date,
        }),
        Err(e) => {
            error!("Availability check for room {room_id} failed: {e}");
            Json(AvailabilityResponse::failure(
                &request,
                "Error connecting to database",
            ))
        }
    }
}

/// Picks a room from the search results
pub async fn choose_room(session: Session, Path(id): Path<String>) -> Result<Response, AppError> {
    let Ok(room_id) = id.parse::<i32>() else {
        return fail_to(&session, "Missing url parameter", "/").await;
    };

    let Some(mut draft) = session::draft(&session).await? else {
        return fail_to(&session, "Can't get reservation from session", "/").await;
    };

    draft.room_id = Some(room_id);
    draft.room_name = None;
    session::set_draft(&session, &draft).await?;

    Ok(Redirect::to("/make-reservation").into_response())
}

/// Starts a booking straight from a room page, once the dates were found available
pub async fn book_room(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<BookRoomQuery>,
) -> Result<Response, AppError> {
    let room_id = query.id.as_deref().and_then(|id| id.parse::<i32>().ok());
    let stay = DateRange::parse(
        query.s.as_deref().unwrap_or_default(),
        query.e.as_deref().unwrap_or_default(),
    )
    .ok();

    let (Some(room_id), Some(stay)) = (room_id, stay) else {
        return fail_to(&session, "Missing query parameter", "/search-availability").await;
    };

    let room = match with_timeout(RoomService::get(&state.db, room_id)).await {
        Ok(room) => room,
        Err(e) => {
            warn!("Can't book room {room_id}: {e}");
            return fail_to(&session, "Can't get room from database", "/search-availability")
                .await;
        }
    };

    let draft = ReservationDraft {
        stay,
        room_id: Some(room.id),
        room_name: Some(room.room_name),
    };
    session::set_draft(&session, &draft).await?;

    Ok(Redirect::to("/make-reservation").into_response())
}
