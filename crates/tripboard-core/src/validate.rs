//! Admission checks for a new or edited segment.

use tripboard_schema::{Segment, SegmentId, TripDateRange};

use crate::PlanError;

/// Decide whether `candidate` may be committed next to `existing`.
///
/// Checks run in a fixed order and stop at the first failure: well-formed
/// range, containment in the trip, then overlap with every sibling except
/// `exclude` (the candidate's own id when editing). Overlap is tested on
/// closed ranges, so a stay ending on day N conflicts with one starting on
/// day N.
pub fn validate_candidate(
    trip: &TripDateRange,
    existing: &[Segment],
    candidate: &TripDateRange,
    exclude: Option<SegmentId>,
) -> Result<(), PlanError> {
    if !candidate.is_well_formed() {
        return Err(PlanError::InvalidRange { dates: *candidate });
    }

    if !trip.contains(candidate) {
        return Err(PlanError::OutOfTripBounds { trip: *trip });
    }

    let conflict = existing
        .iter()
        .filter(|segment| Some(segment.id) != exclude)
        .find(|segment| candidate.overlaps(&segment.dates));

    if let Some(segment) = conflict {
        return Err(PlanError::OverlapsSegment {
            segment_id: segment.id,
            place_name: segment.place_name.clone(),
            dates: segment.dates,
        });
    }

    Ok(())
}
