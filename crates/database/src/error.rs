use sea_orm::DbErr;
use thiserror::Error;

/// Name the storage layer reports when an insert would overlap an existing restriction
const OVERLAP_CONSTRAINT: &str = "room_restrictions_no_overlap";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("room is not available for the requested dates")]
    Unavailable,

    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("database call timed out")]
    Timeout,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Database(#[from] DbErr),
}

impl ServiceError {
    /// Maps a failed restriction insert, recognising the overlap exclusion
    pub(crate) fn from_restriction_insert(err: DbErr) -> Self {
        if err.to_string().contains(OVERLAP_CONSTRAINT) {
            Self::Unavailable
        } else {
            Self::Database(err)
        }
    }
}
