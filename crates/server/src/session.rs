use chrono::NaiveDate;
use database::services::ReservationWithRoom;
use models::{calendar::DayMap, date_range::DateRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tower_sessions::{Session, session::Error};

pub mod keys {
    /// Dates (and later the room) picked while searching
    pub const RESERVATION_DRAFT: &str = "reservation_draft";
    /// A booking just made, shown once on the summary page
    pub const RESERVATION: &str = "reservation";
    pub const USER_ID: &str = "user_id";
    pub const FLASH: &str = "flash";
    pub const WARNING: &str = "warning";
    pub const ERROR: &str = "error";

    /// Owner-block map of a room as last drawn on the calendar
    pub fn block_map(room_id: i32) -> String {
        format!("block_map_{room_id}")
    }
}

/// What the guest has chosen so far on the way to the reservation form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationDraft {
    pub stay: DateRange,
    pub room_id: Option<i32>,
    pub room_name: Option<String>,
}

/// One-shot messages shown on the next rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub flash: Option<String>,
    pub warning: Option<String>,
    pub error: Option<String>,
}

pub async fn flash(session: &Session, message: &str) -> Result<(), Error> {
    session.insert(keys::FLASH, message).await
}

pub async fn warning(session: &Session, message: &str) -> Result<(), Error> {
    session.insert(keys::WARNING, message).await
}

pub async fn error(session: &Session, message: &str) -> Result<(), Error> {
    session.insert(keys::ERROR, message).await
}

/// Removes and returns every pending message
pub async fn take_flash(session: &Session) -> Result<Flash, Error> {
    Ok(Flash {
        flash: session.remove(keys::FLASH).await?,
        warning: session.remove(keys::WARNING).await?,
        error: session.remove(keys::ERROR).await?,
    })
}

pub async fn user_id(session: &Session) -> Result<Option<i32>, Error> {
    session.get(keys::USER_ID).await
}

pub async fn is_authenticated(session: &Session) -> Result<bool, Error> {
    Ok(user_id(session).await?.is_some())
}

pub async fn draft(session: &Session) -> Result<Option<ReservationDraft>, Error> {
    session.get(keys::RESERVATION_DRAFT).await
}

pub async fn set_draft(session: &Session, draft: &ReservationDraft) -> Result<(), Error> {
    session.insert(keys::RESERVATION_DRAFT, draft).await
}

pub async fn set_booked(session: &Session, booked: &ReservationWithRoom) -> Result<(), Error> {
    session.remove::<ReservationDraft>(keys::RESERVATION_DRAFT).await?;
    session.insert(keys::RESERVATION, booked).await
}

/// Takes the booking stored by the reservation form, so the summary shows only once
pub async fn take_booked(session: &Session) -> Result<Option<ReservationWithRoom>, Error> {
    session.remove(keys::RESERVATION).await
}

pub async fn store_block_map(session: &Session, room_id: i32, blocks: &DayMap) -> Result<(), Error> {
    session.insert(&keys::block_map(room_id), blocks).await
}

/// Block maps last drawn for `room_ids`; a room never drawn gets an empty map
pub async fn block_maps(
    session: &Session,
    room_ids: impl IntoIterator<Item = i32>,
) -> Result<BTreeMap<i32, DayMap>, Error> {
    let mut snapshots = BTreeMap::new();

    for room_id in room_ids {
        let blocks: BTreeMap<NaiveDate, i32> = session
            .get(&keys::block_map(room_id))
            .await?
            .unwrap_or_default();
        snapshots.insert(room_id, blocks);
    }

    Ok(snapshots)
}
