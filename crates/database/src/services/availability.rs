use crate::{
    entities::{room_restrictions, rooms},
    error::ServiceError,
};
use models::date_range::DateRange;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait,
};

pub struct AvailabilityService;

impl AvailabilityService {
    /// Restrictions whose span overlaps `stay`, end dates exclusive on both sides
    fn overlapping(stay: DateRange) -> Condition {
        Condition::all()
            .add(room_restrictions::Column::StartDate.lt(stay.end()))
            .add(room_restrictions::Column::EndDate.gt(stay.start()))
    }

    /// Whether nothing restricts `room_id` during `stay`
    pub async fn is_room_available<C: ConnectionTrait>(
        db: &C,
        room_id: i32,
        stay: DateRange,
    ) -> Result<bool, ServiceError> {
        let overlapping = room_restrictions::Entity::find()
            .filter(room_restrictions::Column::RoomId.eq(room_id))
            .filter(Self::overlapping(stay))
            .count(db)
            .await?;

        Ok(overlapping == 0)
    }

    /// Rooms with no restriction overlapping `stay`, ordered by id
    pub async fn available_rooms<C: ConnectionTrait>(
        db: &C,
        stay: DateRange,
    ) -> Result<Vec<rooms::Model>, ServiceError> {
        let taken = room_restrictions::Entity::find()
            .select_only()
            .column(room_restrictions::Column::RoomId)
            .filter(Self::overlapping(stay))
            .into_query();

        Ok(rooms::Entity::find()
            .filter(rooms::Column::Id.not_in_subquery(taken))
            .order_by_asc(rooms::Column::Id)
            .all(db)
            .await?)
    }
}
