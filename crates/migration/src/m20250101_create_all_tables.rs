use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::AccessLevel)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create rooms table
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rooms::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rooms::RoomName).string().not_null())
                    .col(timestamp(Rooms::CreatedAt))
                    .col(timestamp(Rooms::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create restrictions lookup table (reservation / owner block)
        manager
            .create_table(
                Table::create()
                    .table(Restrictions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Restrictions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Restrictions::RestrictionName)
                            .string()
                            .not_null(),
                    )
                    .col(timestamp(Restrictions::CreatedAt))
                    .col(timestamp(Restrictions::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create reservations table
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::FirstName).string().not_null())
                    .col(ColumnDef::new(Reservations::LastName).string().not_null())
                    .col(ColumnDef::new(Reservations::Email).string().not_null())
                    .col(
                        ColumnDef::new(Reservations::Phone)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Reservations::StartDate).date().not_null())
                    .col(ColumnDef::new(Reservations::EndDate).date().not_null())
                    .col(ColumnDef::new(Reservations::RoomId).integer().not_null())
                    .col(
                        ColumnDef::new(Reservations::Processed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp(Reservations::CreatedAt))
                    .col(timestamp(Reservations::UpdatedAt))
                    .check(Expr::col(Reservations::StartDate).lt(Expr::col(Reservations::EndDate)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reservations-room_id")
                            .from(Reservations::Table, Reservations::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create room_restrictions table
        manager
            .create_table(
                Table::create()
                    .table(RoomRestrictions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoomRestrictions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoomRestrictions::StartDate).date().not_null())
                    .col(ColumnDef::new(RoomRestrictions::EndDate).date().not_null())
                    .col(ColumnDef::new(RoomRestrictions::RoomId).integer().not_null())
                    .col(ColumnDef::new(RoomRestrictions::ReservationId).integer())
                    .col(
                        ColumnDef::new(RoomRestrictions::RestrictionId)
                            .integer()
                            .not_null(),
                    )
                    .col(timestamp(RoomRestrictions::CreatedAt))
                    .col(timestamp(RoomRestrictions::UpdatedAt))
                    .check(
                        Expr::col(RoomRestrictions::StartDate)
                            .lt(Expr::col(RoomRestrictions::EndDate)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-room_restrictions-room_id")
                            .from(RoomRestrictions::Table, RoomRestrictions::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // Deleting a reservation frees its dates
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-room_restrictions-reservation_id")
                            .from(RoomRestrictions::Table, RoomRestrictions::ReservationId)
                            .to(Reservations::Table, Reservations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-room_restrictions-restriction_id")
                            .from(RoomRestrictions::Table, RoomRestrictions::RestrictionId)
                            .to(Restrictions::Table, Restrictions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order due to foreign key constraints
        manager
            .drop_table(Table::drop().table(RoomRestrictions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Restrictions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

fn timestamp<T: IntoIden + 'static>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Password,
    AccessLevel,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Rooms {
    Table,
    Id,
    RoomName,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Restrictions {
    Table,
    Id,
    RestrictionName,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Reservations {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    StartDate,
    EndDate,
    RoomId,
    Processed,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum RoomRestrictions {
    Table,
    Id,
    StartDate,
    EndDate,
    RoomId,
    ReservationId,
    RestrictionId,
    CreatedAt,
    UpdatedAt,
}
