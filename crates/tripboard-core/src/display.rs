//! Gap-filled view of a trip for display.
//!
//! The projection is recomputed on every read and never stored. It trusts its
//! input: segments are assumed to satisfy the containment and no-overlap
//! invariants already.

use serde::Serialize;
use tripboard_schema::{DisplaySegment, Segment, Trip, TripDateRange};

use crate::days::day_number;

/// Interleave `segments` with TBD placeholders so that the result covers
/// every day of `trip` exactly once, in order.
pub fn gap_fill(trip: &TripDateRange, segments: &[Segment]) -> Vec<DisplaySegment> {
    let mut sorted: Vec<&Segment> = segments.iter().collect();
    sorted.sort_by_key(|segment| segment.dates.start);

    let mut out = Vec::with_capacity(sorted.len() * 2 + 1);
    let mut cursor = Some(trip.start);

    for segment in sorted {
        if let Some(at) = cursor {
            if at < segment.dates.start {
                if let Some(gap_end) = segment.dates.start.pred_opt() {
                    out.push(DisplaySegment::Tbd {
                        dates: TripDateRange::new(at, gap_end),
                    });
                }
            }
        }
        cursor = segment.dates.end.succ_opt();
        out.push(DisplaySegment::Real(segment.clone()));
    }

    if let Some(at) = cursor {
        if at <= trip.end {
            out.push(DisplaySegment::Tbd {
                dates: TripDateRange::new(at, trip.end),
            });
        }
    }

    out
}

/// One row of an itinerary: a display segment plus its trip day numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItineraryEntry {
    #[serde(flatten)]
    pub segment: DisplaySegment,
    pub first_day: i64,
    pub last_day: i64,
    pub days: i64,
}

impl ItineraryEntry {
    pub fn covers_day(&self, day: i64) -> bool {
        self.first_day <= day && day <= self.last_day
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Itinerary {
    pub trip: Trip,
    pub total_days: i64,
    pub entries: Vec<ItineraryEntry>,
}

impl Itinerary {
    pub fn build(trip: Trip, segments: &[Segment]) -> Self {
        let entries = gap_fill(&trip.dates, segments)
            .into_iter()
            .map(|segment| {
                let dates = segment.dates();
                ItineraryEntry {
                    first_day: day_number(trip.dates.start, dates.start),
                    last_day: day_number(trip.dates.start, dates.end),
                    days: dates.num_days(),
                    segment,
                }
            })
            .collect();

        Self {
            total_days: trip.dates.num_days(),
            trip,
            entries,
        }
    }

    /// The entry, real or TBD, where the traveller is based on `day`.
    pub fn entry_for_day(&self, day: i64) -> Option<&ItineraryEntry> {
        self.entries.iter().find(|entry| entry.covers_day(day))
    }
}
