use crate::db::create_connection;
use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use models::date_range::DateRange;
use sea_orm::DatabaseConnection;

pub(crate) async fn setup_db() -> DatabaseConnection {
    let db = create_connection("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub(crate) fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

pub(crate) fn stay(start: &str, end: &str) -> DateRange {
    DateRange::parse(start, end).unwrap()
}
