//! Planning for edits to a trip's own start and end dates.
//!
//! A plan is computed against the segments as they are, then either handed
//! back whole for the caller to commit in one transaction or rejected whole.
//! Nothing here touches storage.

use serde::Serialize;
use tripboard_schema::{Segment, SegmentId, TripDateRange};

use crate::PlanError;

/// A segment whose dates change because the trip shrank around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentClamp {
    pub segment_id: SegmentId,
    pub place_name: String,
    pub from: TripDateRange,
    pub to: TripDateRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcilePlan {
    pub dates: TripDateRange,
    pub clamped: Vec<SegmentClamp>,
    /// Segments that no longer have any day inside the trip.
    pub deleted: Vec<Segment>,
    /// Every segment that stays, with its post-clamp dates, ordered by start.
    pub survivors: Vec<Segment>,
}

impl ReconcilePlan {
    pub fn is_noop(&self) -> bool {
        self.clamped.is_empty() && self.deleted.is_empty()
    }

    pub fn deleted_ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.deleted.iter().map(|segment| segment.id)
    }
}

/// Pull `dates` inside `bounds`.
///
/// Start is clamped toward the lower bound and then the upper bound; end the
/// other way round. Returns `None` when the segment has no day left inside
/// `bounds`. A segment lying wholly outside would otherwise collapse onto a
/// single boundary day that it never originally covered, so that case is
/// treated as gone rather than kept as a one-day stub.
pub fn clamp_dates(dates: &TripDateRange, bounds: &TripDateRange) -> Option<TripDateRange> {
    let start = dates.start.max(bounds.start).min(bounds.end);
    let end = dates.end.min(bounds.end).max(bounds.start);

    if start > end || !dates.overlaps(bounds) {
        return None;
    }
    Some(TripDateRange::new(start, end))
}

/// Plan the move of a trip from `old` to `new` dates.
///
/// Fails with [`PlanError::InvalidRange`] for an inverted `new` range and
/// with [`PlanError::ClampWouldOverlap`] when two surviving segments would end
/// up sharing a day. Either failure means nothing may be written.
pub fn reconcile(
    old: &TripDateRange,
    new: &TripDateRange,
    segments: &[Segment],
) -> Result<ReconcilePlan, PlanError> {
    if !new.is_well_formed() {
        return Err(PlanError::InvalidRange { dates: *new });
    }

    let mut clamped = Vec::new();
    let mut deleted = Vec::new();
    let mut survivors = Vec::with_capacity(segments.len());

    for segment in segments {
        match clamp_dates(&segment.dates, new) {
            None => deleted.push(segment.clone()),
            Some(dates) => {
                if dates != segment.dates {
                    clamped.push(SegmentClamp {
                        segment_id: segment.id,
                        place_name: segment.place_name.clone(),
                        from: segment.dates,
                        to: dates,
                    });
                }
                survivors.push(Segment {
                    dates,
                    ..segment.clone()
                });
            }
        }
    }

    survivors.sort_by_key(|segment| (segment.dates.start, segment.dates.end));

    // After sorting by start, any overlap shows up against the furthest end
    // seen so far.
    let mut furthest: Option<&Segment> = None;
    for segment in &survivors {
        if let Some(previous) = furthest {
            if previous.dates.overlaps(&segment.dates) {
                tracing::debug!(
                    old = %old,
                    new = %new,
                    first = %previous.place_name,
                    second = %segment.place_name,
                    "trip date change rejected: clamped segments overlap"
                );
                return Err(PlanError::ClampWouldOverlap {
                    first: previous.place_name.clone(),
                    second: segment.place_name.clone(),
                });
            }
        }
        if furthest.is_none_or(|previous| segment.dates.end > previous.dates.end) {
            furthest = Some(segment);
        }
    }

    tracing::debug!(
        old = %old,
        new = %new,
        clamped = clamped.len(),
        deleted = deleted.len(),
        "planned trip date change"
    );

    Ok(ReconcilePlan {
        dates: *new,
        clamped,
        deleted,
        survivors,
    })
}
