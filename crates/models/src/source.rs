use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Admin list a reservation was opened from, used to send the admin back there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListSource {
    New,
    All,
    Calendar,
}

impl FromStr for ListSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "all" => Ok(Self::All),
            "calendar" => Ok(Self::Calendar),
            _ => Err(format!("Unknown reservation source: {s}")),
        }
    }
}

impl Display for ListSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::New => write!(f, "new"),
            Self::All => write!(f, "all"),
            Self::Calendar => write!(f, "calendar"),
        }
    }
}

impl ListSource {
    /// Where to send the admin after acting on a reservation.
    ///
    /// A year means the admin came from a specific calendar month.
    pub fn return_path(self, year: Option<&str>, month: Option<&str>) -> String {
        match year.filter(|y| !y.is_empty()) {
            Some(year) => format!(
                "/admin/reservations-calendar?y={year}&m={}",
                month.unwrap_or_default()
            ),
            None if self == Self::Calendar => "/admin/reservations-calendar".to_string(),
            None => format!("/admin/{self}-reservations"),
        }
    }
}
