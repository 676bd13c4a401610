use sea_orm_migration::{prelude::*, sea_orm::DatabaseBackend};

/// Name shared by the Postgres constraint and the SQLite trigger error, so callers
/// can recognise a rejected overlapping insert from the database error text.
const OVERLAP_CONSTRAINT: &str = "room_restrictions_no_overlap";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        match manager.get_database_backend() {
            DatabaseBackend::Postgres => {
                db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS btree_gist;")
                    .await?;

                db.execute_unprepared(&format!(
                    "ALTER TABLE room_restrictions
                    ADD CONSTRAINT {OVERLAP_CONSTRAINT}
                    EXCLUDE USING gist (
                        room_id WITH =,
                        daterange(start_date, end_date, '[)') WITH &&
                    );"
                ))
                .await?;
            }
            DatabaseBackend::Sqlite => {
                db.execute_unprepared(&format!(
                    "CREATE TRIGGER IF NOT EXISTS {OVERLAP_CONSTRAINT}
                    BEFORE INSERT ON room_restrictions
                    WHEN EXISTS (
                        SELECT 1 FROM room_restrictions
                        WHERE room_id = NEW.room_id
                          AND start_date < NEW.end_date
                          AND end_date > NEW.start_date
                    )
                    BEGIN
                        SELECT RAISE(ABORT, '{OVERLAP_CONSTRAINT}');
                    END;"
                ))
                .await?;
            }
            _ => {
                return Err(DbErr::Migration(
                    "overlap exclusion needs Postgres or SQLite".to_string(),
                ));
            }
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        match manager.get_database_backend() {
            DatabaseBackend::Postgres => {
                db.execute_unprepared(&format!(
                    "ALTER TABLE room_restrictions DROP CONSTRAINT IF EXISTS {OVERLAP_CONSTRAINT};"
                ))
                .await?;
            }
            _ => {
                db.execute_unprepared(&format!("DROP TRIGGER IF EXISTS {OVERLAP_CONSTRAINT};"))
                    .await?;
            }
        }

        Ok(())
    }
}
