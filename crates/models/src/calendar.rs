use crate::date_range::{DATE_FORMAT, DateRange};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    fmt::{Display, Formatter, Result as FmtResult},
};

/// Per-room map of every date in a month to a row id, or 0 when the date is free
pub type DayMap = BTreeMap<NaiveDate, i32>;

/// Prefix of submitted fields asking for a new owner block
const ADD_BLOCK_PREFIX: &str = "add_block_";

/// Prefix of submitted fields marking an existing owner block to be kept
const KEEP_BLOCK_PREFIX: &str = "remove_block_";

/// Errors raised while reading the calendar query string or form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarFormError {
    InvalidYear(String),
    InvalidMonth(String),
    MalformedField(String),
}

impl Display for CalendarFormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InvalidYear(raw) => write!(f, "Invalid year: {raw:?}"),
            Self::InvalidMonth(raw) => write!(f, "Invalid month: {raw:?}"),
            Self::MalformedField(name) => write!(f, "Malformed calendar field: {name:?}"),
        }
    }
}

impl std::error::Error for CalendarFormError {}

/// A calendar month, identified by its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarMonth {
    first: NaiveDate,
}

impl CalendarMonth {
    /// Years outside this range are rejected so that neighbouring months always exist
    const YEARS: std::ops::RangeInclusive<i32> = 1..=9998;

    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !Self::YEARS.contains(&year) {
            return None;
        }

        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// The month containing `day`
    pub fn containing(day: NaiveDate) -> Self {
        Self {
            first: day.with_day(1).unwrap_or(day),
        }
    }

    /// Reads the `y`/`m` pair of the calendar page, falling back to the month of `today`
    /// when no year is given
    pub fn from_query(
        year: Option<&str>,
        month: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, CalendarFormError> {
        let Some(year) = year.filter(|y| !y.trim().is_empty()) else {
            return Ok(Self::containing(today));
        };

        let month = month.unwrap_or_default();
        let parsed_year: i32 = year
            .trim()
            .parse()
            .map_err(|_| CalendarFormError::InvalidYear(year.to_owned()))?;
        let parsed_month: u32 = month
            .trim()
            .parse()
            .map_err(|_| CalendarFormError::InvalidMonth(month.to_owned()))?;

        if !Self::YEARS.contains(&parsed_year) {
            return Err(CalendarFormError::InvalidYear(year.to_owned()));
        }

        Self::new(parsed_year, parsed_month)
            .ok_or_else(|| CalendarFormError::InvalidMonth(month.to_owned()))
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first.pred_opt().unwrap_or(self.first)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn next(&self) -> Self {
        let (year, month) = match self.month() {
            12 => (self.year() + 1, 1),
            m => (self.year(), m + 1),
        };

        Self::new(year, month).unwrap_or(*self)
    }

    pub fn previous(&self) -> Self {
        let (year, month) = match self.month() {
            1 => (self.year() - 1, 12),
            m => (self.year(), m - 1),
        };

        Self::new(year, month).unwrap_or(*self)
    }

    /// The whole month as a half-open range
    pub fn range(&self) -> DateRange {
        DateRange::new(self.first, self.next().first)
            .unwrap_or_else(|_| DateRange::single_day(self.first))
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.first.iter_days().take(self.days_in_month() as usize)
    }

    /// Month formatted as two digits, e.g. `"01"`
    pub fn month_str(&self) -> String {
        format!("{:02}", self.month())
    }

    pub fn year_str(&self) -> String {
        format!("{:04}", self.year())
    }

    /// A day map with every date of the month set to 0
    pub fn empty_day_map(&self) -> DayMap {
        self.days().map(|day| (day, 0)).collect()
    }
}

/// The parts of a stored room restriction needed to draw the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupancy {
    pub restriction_id: i32,
    pub reservation_id: Option<i32>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Occupancy {
    fn reservation(&self) -> Option<i32> {
        self.reservation_id.filter(|id| *id > 0)
    }
}

/// Reservation and owner-block state of one room for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomDayMaps {
    /// Date to the reservation occupying it
    pub reservations: DayMap,
    /// Date to the owner block starting on it
    pub blocks: DayMap,
}

impl RoomDayMaps {
    pub fn build(month: &CalendarMonth, occupancies: &[Occupancy]) -> Self {
        let mut reservations = month.empty_day_map();
        let mut blocks = month.empty_day_map();

        for occupancy in occupancies {
            match occupancy.reservation() {
                Some(reservation_id) => {
                    // Only dates inside the month are drawn
                    let first = occupancy.start.max(month.first_day());
                    let end = occupancy.end.min(month.next().first_day());
                    for day in first.iter_days().take_while(|day| *day < end) {
                        if let Some(slot) = reservations.get_mut(&day) {
                            *slot = reservation_id;
                        }
                    }
                }
                None => {
                    // Owner blocks are one day long
                    if let Some(slot) = blocks.get_mut(&occupancy.start) {
                        *slot = occupancy.restriction_id;
                    }
                }
            }
        }

        Self {
            reservations,
            blocks,
        }
    }
}

/// Name of the field asking for a new owner block
pub fn add_block_field(room_id: i32, day: NaiveDate) -> String {
    format!("{ADD_BLOCK_PREFIX}{room_id}_{}", day.format(DATE_FORMAT))
}

/// Name of the field that keeps an existing owner block.
///
/// The calendar emits it checked for every existing block; unchecking it deletes the block.
pub fn keep_block_field(room_id: i32, day: NaiveDate) -> String {
    format!("{KEEP_BLOCK_PREFIX}{room_id}_{}", day.format(DATE_FORMAT))
}

/// Parses `add_block_{room_id}_{date}`, returning `None` for unrelated fields
fn parse_add_block_field(name: &str) -> Option<Result<(i32, NaiveDate), CalendarFormError>> {
    let rest = name.strip_prefix(ADD_BLOCK_PREFIX)?;
    let malformed = || CalendarFormError::MalformedField(name.to_owned());

    let parsed = rest.split_once('_').ok_or_else(|| malformed()).and_then(|(room, day)| {
        let room_id = room.parse::<i32>().map_err(|_| malformed())?;
        let day = NaiveDate::parse_from_str(day, DATE_FORMAT).map_err(|_| malformed())?;
        Ok((room_id, day))
    });

    Some(parsed)
}

/// Owner-block writes derived from a calendar submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockEdits {
    /// Restriction ids of owner blocks to delete
    pub removals: BTreeSet<i32>,
    /// `(room_id, date)` pairs to block
    pub additions: BTreeSet<(i32, NaiveDate)>,
}

impl BlockEdits {
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty()
    }
}

/// Diffs the block maps served with the calendar against the submitted fields.
///
/// `snapshots` holds the block map of every room as it was last rendered. A nonzero
/// snapshot entry without a non-empty keep field is removed; an add field for a date
/// that is not already blocked in the snapshot is added. Any malformed add field fails
/// the whole submission.
pub fn reconcile<'a, I>(
    snapshots: &BTreeMap<i32, DayMap>,
    fields: I,
) -> Result<BlockEdits, CalendarFormError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut submitted = HashSet::new();
    let mut requested = Vec::new();

    for (name, value) in fields {
        if let Some(parsed) = parse_add_block_field(name) {
            requested.push(parsed?);
        }
        if !value.is_empty() {
            submitted.insert(name);
        }
    }

    let mut edits = BlockEdits::default();

    for (room_id, blocks) in snapshots {
        for (day, restriction_id) in blocks {
            if *restriction_id == 0 {
                continue;
            }

            if !submitted.contains(keep_block_field(*room_id, *day).as_str()) {
                edits.removals.insert(*restriction_id);
            }
        }
    }

    for (room_id, day) in requested {
        let already_blocked = snapshots
            .get(&room_id)
            .and_then(|blocks| blocks.get(&day))
            .is_some_and(|id| *id != 0);

        if !already_blocked {
            edits.additions.insert((room_id, day));
        }
    }

    Ok(edits)
}
