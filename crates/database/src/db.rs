use crate::error::ServiceError;
use log::info;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use std::{future::Future, time::Duration};

/// How long a single service call may run before it is abandoned
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(3);

const MAX_CONNECTIONS: u32 = 10;
const MAX_LIFETIME: Duration = Duration::from_secs(5 * 60);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

/// Creates a database connection pool
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(MAX_CONNECTIONS)
        .max_lifetime(MAX_LIFETIME)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .sqlx_logging(false);

    // Every connection to an in-memory SQLite database opens a fresh database
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;
    info!("Connected to {:?} database", db.get_database_backend());

    Ok(db)
}

/// Runs a service call under [`QUERY_TIMEOUT`]
pub async fn with_timeout<T, F>(call: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    tokio::time::timeout(QUERY_TIMEOUT, call)
        .await
        .map_err(|_| ServiceError::Timeout)?
}

#[cfg(test)]
mod test {
    use super::{create_connection, with_timeout};
    use crate::error::ServiceError;
    use sea_orm::{ConnectionTrait, DatabaseBackend};
    use std::time::Duration;

    #[tokio::test]
    async fn test_memory_connection_is_sqlite() {
        let db = create_connection("sqlite::memory:").await.unwrap();
        assert_eq!(db.get_database_backend(), DatabaseBackend::Sqlite);
        db.ping().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let result: Result<(), _> = with_timeout(async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(ServiceError::Timeout)));
    }
}
