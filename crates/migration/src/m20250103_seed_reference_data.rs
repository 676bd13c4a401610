use sea_orm_migration::{prelude::*, sea_orm::DatabaseBackend};

#[derive(DeriveMigrationName)]
pub struct Migration;

const ROOMS: [(i32, &str); 2] = [(1, "General's Quarters"), (2, "Major's Suite")];

// Ids are fixed, the application refers to them directly
const RESTRICTIONS: [(i32, &str); 2] = [(1, "Reservation"), (2, "Owner Block")];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut rooms = Query::insert();
        rooms
            .into_table(Rooms::Table)
            .columns([Rooms::Id, Rooms::RoomName]);
        for (id, name) in ROOMS {
            rooms.values_panic([id.into(), name.into()]);
        }
        manager.exec_stmt(rooms).await?;

        let mut restrictions = Query::insert();
        restrictions
            .into_table(Restrictions::Table)
            .columns([Restrictions::Id, Restrictions::RestrictionName]);
        for (id, name) in RESTRICTIONS {
            restrictions.values_panic([id.into(), name.into()]);
        }
        manager.exec_stmt(restrictions).await?;

        if manager.get_database_backend() == DatabaseBackend::Postgres {
            // Explicit ids leave the serial sequences behind
            for table in ["rooms", "restrictions"] {
                manager
                    .get_connection()
                    .execute_unprepared(&format!(
                        "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
                         (SELECT MAX(id) FROM {table}));"
                    ))
                    .await?;
            }
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Restrictions::Table)
                    .and_where(Expr::col(Restrictions::Id).is_in(RESTRICTIONS.map(|(id, _)| id)))
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Rooms::Table)
                    .and_where(Expr::col(Rooms::Id).is_in(ROOMS.map(|(id, _)| id)))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Rooms {
    Table,
    Id,
    RoomName,
}

#[derive(Iden)]
enum Restrictions {
    Table,
    Id,
    RestrictionName,
}
