use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Availability and calendar lookups filter by room and date window
        manager
            .create_index(
                Index::create()
                    .name("idx_room_restrictions_room_dates")
                    .table(RoomRestrictions::Table)
                    .col(RoomRestrictions::RoomId)
                    .col(RoomRestrictions::StartDate)
                    .col(RoomRestrictions::EndDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_room_restrictions_reservation_id")
                    .table(RoomRestrictions::Table)
                    .col(RoomRestrictions::ReservationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_processed")
                    .table(Reservations::Table)
                    .col(Reservations::Processed)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_reservations_processed")
                    .table(Reservations::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_room_restrictions_reservation_id")
                    .table(RoomRestrictions::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_room_restrictions_room_dates")
                    .table(RoomRestrictions::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum RoomRestrictions {
    Table,
    RoomId,
    ReservationId,
    StartDate,
    EndDate,
}

#[derive(Iden)]
enum Reservations {
    Table,
    Processed,
}
