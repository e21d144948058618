pub mod date_only;

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use date_only::{format_date, parse_date, DateParseError};

pub type TripId = Uuid;
pub type SegmentId = Uuid;

/// Inclusive span of calendar days.
///
/// Construction does not enforce `start <= end`; callers that accept ranges
/// from outside check [`TripDateRange::is_well_formed`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripDateRange {
    #[serde(with = "date_only")]
    pub start: NaiveDate,
    #[serde(with = "date_only")]
    pub end: NaiveDate,
}

impl TripDateRange {
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, DateParseError> {
        Ok(Self::new(parse_date(start)?, parse_date(end)?))
    }

    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether every day of `other` falls inside this range.
    pub fn contains(&self, other: &TripDateRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Closed-interval intersection test. Ranges that touch on a single day
    /// overlap.
    pub fn overlaps(&self, other: &TripDateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for TripDateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", format_date(self.start), format_date(self.end))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub title: String,
    pub dates: TripDateRange,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(title: impl Into<String>, dates: TripDateRange) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            dates,
            created_at: Utc::now(),
        }
    }
}

/// Where the traveller is based for part of a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub trip_id: TripId,
    pub place_name: String,
    pub dates: TripDateRange,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Segment {
    pub fn from_draft(trip_id: TripId, draft: SegmentDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id,
            place_name: draft.place_name,
            dates: draft.dates,
            notes: draft.notes,
        }
    }
}

/// User-supplied fields of a segment that has not been committed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentDraft {
    pub place_name: String,
    pub dates: TripDateRange,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripWithSegments {
    pub trip: Trip,
    /// Ordered by start date.
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Real,
    Tbd,
}

/// Entry of the gap-filled display sequence. Derived on read, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplaySegment {
    Real(Segment),
    Tbd { dates: TripDateRange },
}

impl DisplaySegment {
    pub fn kind(&self) -> SegmentKind {
        match self {
            DisplaySegment::Real(_) => SegmentKind::Real,
            DisplaySegment::Tbd { .. } => SegmentKind::Tbd,
        }
    }

    pub fn dates(&self) -> TripDateRange {
        match self {
            DisplaySegment::Real(segment) => segment.dates,
            DisplaySegment::Tbd { dates } => *dates,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DisplaySegment::Real(segment) => &segment.place_name,
            DisplaySegment::Tbd { .. } => "TBD",
        }
    }
}
