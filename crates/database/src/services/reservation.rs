use crate::{
    entities::{reservations, room_restrictions, rooms},
    error::ServiceError,
    services::{AvailabilityService, RoomService},
};
use chrono::Utc;
use log::info;
use models::{date_range::DateRange, restriction_kind::RestrictionKind};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};
use serde::{Deserialize, Serialize};

/// A booking ready to be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub room_id: i32,
    pub stay: DateRange,
}

/// Guest fields an administrator may edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// A reservation joined with the name of its room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationWithRoom {
    pub reservation: reservations::Model,
    pub room_name: String,
}

impl From<(reservations::Model, Option<rooms::Model>)> for ReservationWithRoom {
    fn from((reservation, room): (reservations::Model, Option<rooms::Model>)) -> Self {
        Self {
            reservation,
            room_name: room.map(|room| room.room_name).unwrap_or_default(),
        }
    }
}

pub struct ReservationService;

impl ReservationService {
    /// Books a room: the reservation and its restriction are written together or not at all.
    ///
    /// Fails with [`ServiceError::Unavailable`] when anything already restricts the room
    /// during the stay, whether the pre-check or the storage exclusion catches it.
    pub async fn create(
        db: &DatabaseConnection,
        new: NewReservation,
    ) -> Result<(reservations::Model, rooms::Model), ServiceError> {
        let txn = db.begin().await?;

        let room = RoomService::get(&txn, new.room_id).await?;
        if !AvailabilityService::is_room_available(&txn, room.id, new.stay).await? {
            return Err(ServiceError::Unavailable);
        }

        let now = Utc::now().naive_utc();
        let reservation = reservations::ActiveModel {
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            email: Set(new.email),
            phone: Set(new.phone),
            start_date: Set(new.stay.start()),
            end_date: Set(new.stay.end()),
            room_id: Set(room.id),
            processed: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        room_restrictions::ActiveModel {
            start_date: Set(new.stay.start()),
            end_date: Set(new.stay.end()),
            room_id: Set(room.id),
            reservation_id: Set(Some(reservation.id)),
            kind: Set(RestrictionKind::Reservation),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::from_restriction_insert)?;

        txn.commit().await?;
        info!(
            "Reservation {} booked {} for {}",
            reservation.id, room.room_name, new.stay
        );

        Ok((reservation, room))
    }

    pub async fn get<C: ConnectionTrait>(
        db: &C,
        id: i32,
    ) -> Result<ReservationWithRoom, ServiceError> {
        reservations::Entity::find_by_id(id)
            .find_also_related(rooms::Entity)
            .one(db)
            .await?
            .map(ReservationWithRoom::from)
            .ok_or(ServiceError::NotFound {
                entity: "reservation",
                id,
            })
    }

    /// Every reservation, earliest stay first
    pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<ReservationWithRoom>, ServiceError> {
        let rows = reservations::Entity::find()
            .find_also_related(rooms::Entity)
            .order_by_asc(reservations::Column::StartDate)
            .all(db)
            .await?;

        Ok(rows.into_iter().map(ReservationWithRoom::from).collect())
    }

    /// Reservations the administrator has not processed yet, earliest stay first
    pub async fn unprocessed<C: ConnectionTrait>(
        db: &C,
    ) -> Result<Vec<ReservationWithRoom>, ServiceError> {
        let rows = reservations::Entity::find()
            .find_also_related(rooms::Entity)
            .filter(reservations::Column::Processed.eq(false))
            .order_by_asc(reservations::Column::StartDate)
            .all(db)
            .await?;

        Ok(rows.into_iter().map(ReservationWithRoom::from).collect())
    }

    pub async fn update_guest<C: ConnectionTrait>(
        db: &C,
        id: i32,
        details: GuestDetails,
    ) -> Result<reservations::Model, ServiceError> {
        let reservation = reservations::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "reservation",
                id,
            })?;

        let mut reservation: reservations::ActiveModel = reservation.into();
        reservation.first_name = Set(details.first_name);
        reservation.last_name = Set(details.last_name);
        reservation.email = Set(details.email);
        reservation.phone = Set(details.phone);
        reservation.updated_at = Set(Utc::now().naive_utc());

        Ok(reservation.update(db).await?)
    }

    pub async fn mark_processed<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), ServiceError> {
        let result = reservations::Entity::update_many()
            .col_expr(reservations::Column::Processed, Expr::value(true))
            .col_expr(
                reservations::Column::UpdatedAt,
                Expr::value(Utc::now().naive_utc()),
            )
            .filter(reservations::Column::Id.eq(id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound {
                entity: "reservation",
                id,
            });
        }

        Ok(())
    }

    /// Deletes a reservation. Its restriction is removed by the cascading foreign key.
    pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), ServiceError> {
        let result = reservations::Entity::delete_by_id(id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound {
                entity: "reservation",
                id,
            });
        }

        info!("Deleted reservation {id}");
        Ok(())
    }
}
