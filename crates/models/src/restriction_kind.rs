use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

#[cfg(feature = "database")]
use sea_orm::Value;

/// What a room restriction represents.
///
/// Stored as the `restriction_id` column, which references the seeded `restrictions` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestrictionKind {
    /// The span is occupied by a guest reservation
    Reservation,
    /// The owner has blocked the room for the day
    OwnerBlock,
}

impl RestrictionKind {
    pub const fn id(self) -> i32 {
        match self {
            Self::Reservation => 1,
            Self::OwnerBlock => 2,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Reservation),
            2 => Some(Self::OwnerBlock),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Reservation => "Reservation",
            Self::OwnerBlock => "Owner Block",
        }
    }
}

impl Display for RestrictionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name())
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::ValueType for RestrictionKind {
    fn try_from(v: Value) -> Result<Self, sea_orm::sea_query::ValueTypeErr> {
        match v {
            Value::Int(Some(id)) => Self::from_id(id).ok_or(sea_orm::sea_query::ValueTypeErr),
            _ => Err(sea_orm::sea_query::ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "RestrictionKind".to_string()
    }

    fn array_type() -> sea_orm::sea_query::ArrayType {
        sea_orm::sea_query::ArrayType::Int
    }

    fn column_type() -> sea_orm::sea_query::ColumnType {
        sea_orm::sea_query::ColumnType::Integer
    }
}

#[cfg(feature = "database")]
impl From<RestrictionKind> for Value {
    fn from(kind: RestrictionKind) -> Self {
        Value::Int(Some(kind.id()))
    }
}

#[cfg(feature = "database")]
impl sea_orm::TryGetable for RestrictionKind {
    fn try_get_by<I: sea_orm::ColIdx>(
        res: &sea_orm::QueryResult,
        index: I,
    ) -> Result<Self, sea_orm::TryGetError> {
        let id: i32 = res.try_get_by(index)?;

        Self::from_id(id).ok_or_else(|| {
            sea_orm::TryGetError::DbErr(sea_orm::DbErr::Type(format!(
                "Unknown restriction id: {id}"
            )))
        })
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::Nullable for RestrictionKind {
    fn null() -> Value {
        Value::Int(None)
    }
}
