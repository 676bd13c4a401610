use crate::{entities::rooms, error::ServiceError};
use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder};

pub struct RoomService;

impl RoomService {
    pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<rooms::Model>, ServiceError> {
        Ok(rooms::Entity::find()
            .order_by_asc(rooms::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: i32) -> Result<rooms::Model, ServiceError> {
        rooms::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound { entity: "room", id })
    }
}
