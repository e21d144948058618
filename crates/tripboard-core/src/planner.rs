use std::sync::Arc;

use tripboard_schema::{
    Segment, SegmentDraft, SegmentId, Trip, TripDateRange, TripId, TripWithSegments,
};

use crate::{
    reconcile, validate_candidate, BatchOp, Itinerary, ItineraryEntry, PlanError, ReconcilePlan,
    TripBatch, TripLockGuard, TripLockManager, TripStore,
};

/// Entry point for every trip and segment operation.
///
/// Each mutation holds the trip's lock across load, validation and commit,
/// and commits through a single [`TripBatch`].
#[derive(Clone)]
pub struct TripPlanner {
    store: Arc<dyn TripStore>,
    locks: TripLockManager,
}

impl TripPlanner {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self {
            store,
            locks: TripLockManager::new(),
        }
    }

    pub fn locks(&self) -> &TripLockManager {
        &self.locks
    }

    pub async fn create_trip(&self, title: &str, dates: TripDateRange) -> Result<Trip, PlanError> {
        let title = required("title", title)?;
        if !dates.is_well_formed() {
            return Err(PlanError::InvalidRange { dates });
        }

        let trip = Trip::new(title, dates);
        self.store.create_trip(&trip).await?;
        tracing::info!(trip_id = %trip.id, dates = %trip.dates, "trip created");
        Ok(trip)
    }

    pub async fn list_trips(&self) -> Result<Vec<Trip>, PlanError> {
        Ok(self.store.list_trips().await?)
    }

    pub async fn get_trip(&self, trip_id: TripId) -> Result<TripWithSegments, PlanError> {
        self.store
            .load_trip(trip_id)
            .await?
            .ok_or_else(|| PlanError::trip_not_found(trip_id))
    }

    pub async fn delete_trip(&self, trip_id: TripId) -> Result<(), PlanError> {
        let guard = self.lock_existing(trip_id).await?;
        let deleted = self.store.delete_trip(trip_id).await;
        drop(guard);
        self.locks.release(trip_id).await;

        if !deleted? {
            return Err(PlanError::trip_not_found(trip_id));
        }
        tracing::info!(%trip_id, "trip deleted");
        Ok(())
    }

    pub async fn create_segment(
        &self,
        trip_id: TripId,
        draft: SegmentDraft,
    ) -> Result<Segment, PlanError> {
        let draft = normalize(draft)?;
        let _guard = self.lock_existing(trip_id).await?;
        let loaded = self.get_trip(trip_id).await?;

        validate_candidate(&loaded.trip.dates, &loaded.segments, &draft.dates, None).inspect_err(
            |err| tracing::debug!(%trip_id, dates = %draft.dates, error = %err, "segment rejected"),
        )?;

        let segment = Segment::from_draft(trip_id, draft);
        self.store
            .apply(TripBatch::new(trip_id).push(BatchOp::InsertSegment(segment.clone())))
            .await?;
        tracing::info!(%trip_id, segment_id = %segment.id, dates = %segment.dates, "segment created");
        Ok(segment)
    }

    pub async fn update_segment(
        &self,
        segment_id: SegmentId,
        draft: SegmentDraft,
    ) -> Result<Segment, PlanError> {
        let draft = normalize(draft)?;
        let trip_id = self.segment_trip(segment_id).await?;
        let _guard = self.locks.acquire(trip_id).await;

        // Re-read under the lock; the segment may have gone in the meantime.
        let loaded = self.get_trip(trip_id).await?;
        let current = loaded
            .segments
            .iter()
            .find(|s| s.id == segment_id)
            .ok_or_else(|| PlanError::segment_not_found(segment_id))?;

        validate_candidate(
            &loaded.trip.dates,
            &loaded.segments,
            &draft.dates,
            Some(segment_id),
        )?;

        let updated = Segment {
            place_name: draft.place_name,
            dates: draft.dates,
            notes: draft.notes,
            ..current.clone()
        };
        self.store
            .apply(TripBatch::new(trip_id).push(BatchOp::UpdateSegment(updated.clone())))
            .await?;
        tracing::info!(%trip_id, %segment_id, dates = %updated.dates, "segment updated");
        Ok(updated)
    }

    pub async fn delete_segment(&self, segment_id: SegmentId) -> Result<(), PlanError> {
        let trip_id = self.segment_trip(segment_id).await?;
        let _guard = self.locks.acquire(trip_id).await;

        let loaded = self.get_trip(trip_id).await?;
        if !loaded.segments.iter().any(|s| s.id == segment_id) {
            return Err(PlanError::segment_not_found(segment_id));
        }

        self.store
            .apply(TripBatch::new(trip_id).push(BatchOp::DeleteSegment(segment_id)))
            .await?;
        tracing::info!(%trip_id, %segment_id, "segment deleted");
        Ok(())
    }

    /// Move the trip to `dates`, clamping or dropping segments as needed.
    pub async fn update_trip_dates(
        &self,
        trip_id: TripId,
        dates: TripDateRange,
    ) -> Result<ReconcilePlan, PlanError> {
        let _guard = self.lock_existing(trip_id).await?;
        let loaded = self.get_trip(trip_id).await?;
        let plan = reconcile(&loaded.trip.dates, &dates, &loaded.segments).inspect_err(|err| {
            tracing::warn!(%trip_id, to = %dates, error = %err, "trip date change rejected");
        })?;

        if loaded.trip.dates == dates && plan.is_noop() {
            return Ok(plan);
        }

        self.store.apply(TripBatch::from_plan(trip_id, &plan)).await?;
        tracing::info!(
            %trip_id,
            from = %loaded.trip.dates,
            to = %dates,
            clamped = plan.clamped.len(),
            deleted = plan.deleted.len(),
            "trip dates updated"
        );
        Ok(plan)
    }

    /// Plan a date change without writing it.
    pub async fn preview_trip_dates(
        &self,
        trip_id: TripId,
        dates: TripDateRange,
    ) -> Result<ReconcilePlan, PlanError> {
        let loaded = self.get_trip(trip_id).await?;
        reconcile(&loaded.trip.dates, &dates, &loaded.segments)
    }

    pub async fn itinerary(&self, trip_id: TripId) -> Result<Itinerary, PlanError> {
        let loaded = self.get_trip(trip_id).await?;
        Ok(Itinerary::build(loaded.trip, &loaded.segments))
    }

    /// Where the traveller is based on trip day `day`.
    pub async fn base_for_day(&self, trip_id: TripId, day: i64) -> Result<ItineraryEntry, PlanError> {
        let itinerary = self.itinerary(trip_id).await?;
        itinerary
            .entry_for_day(day)
            .cloned()
            .ok_or(PlanError::OutOfTripBounds {
                trip: itinerary.trip.dates,
            })
    }

    /// Lock a trip only once it is known to exist, so lookups of unknown ids
    /// never leave a lock entry behind.
    async fn lock_existing(&self, trip_id: TripId) -> Result<TripLockGuard, PlanError> {
        if self.store.load_trip(trip_id).await?.is_none() {
            return Err(PlanError::trip_not_found(trip_id));
        }
        Ok(self.locks.acquire(trip_id).await)
    }

    async fn segment_trip(&self, segment_id: SegmentId) -> Result<TripId, PlanError> {
        self.store
            .find_segment(segment_id)
            .await?
            .map(|segment| segment.trip_id)
            .ok_or_else(|| PlanError::segment_not_found(segment_id))
    }
}

fn required(field: &'static str, value: &str) -> Result<String, PlanError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PlanError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

fn normalize(draft: SegmentDraft) -> Result<SegmentDraft, PlanError> {
    Ok(SegmentDraft {
        place_name: required("place_name", &draft.place_name)?,
        dates: draft.dates,
        notes: draft
            .notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty()),
    })
}
