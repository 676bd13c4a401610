use crate::{entities::room_restrictions, error::ServiceError};
use chrono::Utc;
use log::info;
use models::{
    calendar::{BlockEdits, CalendarMonth, Occupancy},
    date_range::DateRange,
    restriction_kind::RestrictionKind,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

pub struct RestrictionService;

impl RestrictionService {
    /// Restrictions of `room_id` that touch any day of `month`
    pub async fn for_room_in_month<C: ConnectionTrait>(
        db: &C,
        room_id: i32,
        month: &CalendarMonth,
    ) -> Result<Vec<Occupancy>, ServiceError> {
        let restrictions = room_restrictions::Entity::find()
            .filter(room_restrictions::Column::RoomId.eq(room_id))
            .filter(room_restrictions::Column::EndDate.gt(month.first_day()))
            .filter(room_restrictions::Column::StartDate.lte(month.last_day()))
            .order_by_asc(room_restrictions::Column::StartDate)
            .all(db)
            .await?;

        Ok(restrictions
            .into_iter()
            .map(|restriction| Occupancy {
                restriction_id: restriction.id,
                reservation_id: restriction.reservation_id,
                start: restriction.start_date,
                end: restriction.end_date,
            })
            .collect())
    }

    /// Applies a calendar submission atomically: removals first, then one-day blocks.
    ///
    /// Only owner blocks are ever removed here, reservation restrictions go with their
    /// reservation.
    pub async fn apply_block_edits(
        db: &DatabaseConnection,
        edits: &BlockEdits,
    ) -> Result<(), ServiceError> {
        if edits.is_empty() {
            return Ok(());
        }

        let txn = db.begin().await?;

        if !edits.removals.is_empty() {
            let removed = room_restrictions::Entity::delete_many()
                .filter(room_restrictions::Column::Id.is_in(edits.removals.iter().copied()))
                .filter(room_restrictions::Column::Kind.eq(RestrictionKind::OwnerBlock))
                .exec(&txn)
                .await?;
            info!("Removed {} owner blocks", removed.rows_affected);
        }

        let now = Utc::now().naive_utc();
        for &(room_id, day) in &edits.additions {
            let block = DateRange::single_day(day);
            room_restrictions::ActiveModel {
                start_date: Set(block.start()),
                end_date: Set(block.end()),
                room_id: Set(room_id),
                reservation_id: Set(None),
                kind: Set(RestrictionKind::OwnerBlock),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::from_restriction_insert)?;
        }

        txn.commit().await?;
        info!("Added {} owner blocks", edits.additions.len());

        Ok(())
    }
}
