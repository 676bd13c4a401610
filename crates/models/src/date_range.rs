use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Date format used in forms, query strings and JSON payloads
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors produced while building a [`DateRange`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// A date could not be parsed as `YYYY-MM-DD`
    InvalidDate(String),
    /// The start date is not strictly before the end date
    NotIncreasing { start: NaiveDate, end: NaiveDate },
}

impl Display for DateRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InvalidDate(raw) => write!(f, "Invalid date: {raw:?}"),
            Self::NotIncreasing { start, end } => {
                write!(f, "Start date {start} must be before end date {end}")
            }
        }
    }
}

impl std::error::Error for DateRangeError {}

/// Parses a single `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| DateRangeError::InvalidDate(raw.to_owned()))
}

/// A half-open span of calendar dates, `[start, end)`
///
/// The end date is exclusive: a stay ending on day D leaves D free for the next guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(DateRangeError::NotIncreasing { start, end })
        }
    }

    /// Parses a range from two `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self, DateRangeError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// The one-day range starting at `day`
    pub fn single_day(day: NaiveDate) -> Self {
        let end = day.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
        Self { start: day, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of nights covered by the range
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// `self.start < other.end && self.end > other.start`
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }

    /// Every date in `[start, end)`
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |day| *day < self.end)
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} to {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}
