use tripboard_schema::{SegmentId, TripDateRange};
use uuid::Uuid;

/// Outcome of a rejected planning operation.
///
/// Every variant except [`PlanError::Storage`] is an expected result of user
/// input and is reported back to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("start must be before or equal to end (got {dates})")]
    InvalidRange { dates: TripDateRange },

    #[error("{field} must not be empty")]
    MissingField { field: &'static str },

    #[error("dates must fall within the trip, which runs {trip}")]
    OutOfTripBounds { trip: TripDateRange },

    #[error("dates overlap {place_name} ({dates})")]
    OverlapsSegment {
        segment_id: SegmentId,
        place_name: String,
        dates: TripDateRange,
    },

    #[error(
        "new trip dates would squeeze {first} and {second} onto the same days; adjust those segments manually first"
    )]
    ClampWouldOverlap { first: String, second: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl PlanError {
    pub fn trip_not_found(id: Uuid) -> Self {
        PlanError::NotFound { kind: "trip", id }
    }

    pub fn segment_not_found(id: Uuid) -> Self {
        PlanError::NotFound {
            kind: "segment",
            id,
        }
    }

    /// Stable machine-readable code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::InvalidRange { .. } => "invalid_range",
            PlanError::MissingField { .. } => "missing_field",
            PlanError::OutOfTripBounds { .. } => "out_of_trip_bounds",
            PlanError::OverlapsSegment { .. } => "overlaps_segment",
            PlanError::ClampWouldOverlap { .. } => "clamp_would_overlap",
            PlanError::NotFound { .. } => "not_found",
            PlanError::Storage(_) => "internal",
        }
    }

    /// False only for failures the user cannot fix by changing their input.
    pub fn is_expected(&self) -> bool {
        !matches!(self, PlanError::Storage(_))
    }
}
