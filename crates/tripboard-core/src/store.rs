use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tripboard_schema::{Segment, SegmentId, Trip, TripDateRange, TripId, TripWithSegments};

use crate::ReconcilePlan;

/// One write inside a [`TripBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    SetTripDates(TripDateRange),
    InsertSegment(Segment),
    UpdateSegment(Segment),
    DeleteSegment(SegmentId),
}

/// Writes against a single trip that must land together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripBatch {
    pub trip_id: TripId,
    pub ops: Vec<BatchOp>,
}

impl TripBatch {
    pub fn new(trip_id: TripId) -> Self {
        Self {
            trip_id,
            ops: Vec::new(),
        }
    }

    pub fn push(mut self, op: BatchOp) -> Self {
        self.ops.push(op);
        self
    }

    /// New trip dates, every clamped segment and every deletion of `plan`.
    pub fn from_plan(trip_id: TripId, plan: &ReconcilePlan) -> Self {
        let mut batch = Self::new(trip_id).push(BatchOp::SetTripDates(plan.dates));
        for clamp in &plan.clamped {
            if let Some(segment) = plan.survivors.iter().find(|s| s.id == clamp.segment_id) {
                batch = batch.push(BatchOp::UpdateSegment(segment.clone()));
            }
        }
        for id in plan.deleted_ids() {
            batch = batch.push(BatchOp::DeleteSegment(id));
        }
        batch
    }
}

/// Persistence for trips and their segments.
///
/// `apply` must be all-or-nothing: if any op fails, none of the batch is
/// visible afterwards.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn create_trip(&self, trip: &Trip) -> Result<()>;
    async fn list_trips(&self) -> Result<Vec<Trip>>;
    /// Trip plus its segments ordered by start date.
    async fn load_trip(&self, trip_id: TripId) -> Result<Option<TripWithSegments>>;
    async fn find_segment(&self, segment_id: SegmentId) -> Result<Option<Segment>>;
    /// Removes the trip and its segments. Returns false if it did not exist.
    async fn delete_trip(&self, trip_id: TripId) -> Result<bool>;
    async fn apply(&self, batch: TripBatch) -> Result<()>;
}

/// Process-local store for tests and throwaway runs.
#[derive(Clone, Default)]
pub struct InMemoryTripStore {
    trips: Arc<Mutex<HashMap<TripId, TripWithSegments>>>,
}

impl InMemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TripStore for InMemoryTripStore {
    async fn create_trip(&self, trip: &Trip) -> Result<()> {
        let mut trips = self.trips.lock().await;
        if trips.contains_key(&trip.id) {
            return Err(anyhow!("trip already exists: {}", trip.id));
        }
        trips.insert(
            trip.id,
            TripWithSegments {
                trip: trip.clone(),
                segments: Vec::new(),
            },
        );
        Ok(())
    }

    async fn list_trips(&self) -> Result<Vec<Trip>> {
        let trips = self.trips.lock().await;
        let mut list: Vec<Trip> = trips.values().map(|t| t.trip.clone()).collect();
        list.sort_by_key(|trip| (trip.dates.start, trip.created_at));
        Ok(list)
    }

    async fn load_trip(&self, trip_id: TripId) -> Result<Option<TripWithSegments>> {
        let trips = self.trips.lock().await;
        Ok(trips.get(&trip_id).cloned().map(|mut loaded| {
            loaded.segments.sort_by_key(|s| s.dates.start);
            loaded
        }))
    }

    async fn find_segment(&self, segment_id: SegmentId) -> Result<Option<Segment>> {
        let trips = self.trips.lock().await;
        Ok(trips
            .values()
            .flat_map(|t| t.segments.iter())
            .find(|s| s.id == segment_id)
            .cloned())
    }

    async fn delete_trip(&self, trip_id: TripId) -> Result<bool> {
        Ok(self.trips.lock().await.remove(&trip_id).is_some())
    }

    async fn apply(&self, batch: TripBatch) -> Result<()> {
        let mut trips = self.trips.lock().await;
        let current = trips
            .get(&batch.trip_id)
            .ok_or_else(|| anyhow!("trip not found: {}", batch.trip_id))?;

        // Work on a copy so a failing op leaves the stored trip untouched.
        let mut staged = current.clone();
        for op in batch.ops {
            match op {
                BatchOp::SetTripDates(dates) => staged.trip.dates = dates,
                BatchOp::InsertSegment(segment) => {
                    if segment.trip_id != batch.trip_id {
                        return Err(anyhow!(
                            "segment {} belongs to trip {}, not {}",
                            segment.id,
                            segment.trip_id,
                            batch.trip_id
                        ));
                    }
                    staged.segments.push(segment);
                }
                BatchOp::UpdateSegment(segment) => {
                    let slot = staged
                        .segments
                        .iter_mut()
                        .find(|s| s.id == segment.id)
                        .ok_or_else(|| anyhow!("segment not found: {}", segment.id))?;
                    *slot = segment;
                }
                BatchOp::DeleteSegment(id) => {
                    let before = staged.segments.len();
                    staged.segments.retain(|s| s.id != id);
                    if staged.segments.len() == before {
                        return Err(anyhow!("segment not found: {id}"));
                    }
                }
            }
        }

        trips.insert(batch.trip_id, staged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn range(start: &str, end: &str) -> TripDateRange {
        TripDateRange::parse(start, end).unwrap()
    }

    #[tokio::test]
    async fn failed_batch_leaves_trip_untouched() {
        let store = InMemoryTripStore::new();
        let trip = Trip::new("Italy", range("2026-06-01", "2026-06-10"));
        store.create_trip(&trip).await.unwrap();

        let batch = TripBatch::new(trip.id)
            .push(BatchOp::SetTripDates(range("2026-06-01", "2026-06-04")))
            .push(BatchOp::DeleteSegment(Uuid::new_v4()));
        assert!(store.apply(batch).await.is_err());

        let loaded = store.load_trip(trip.id).await.unwrap().unwrap();
        assert_eq!(loaded.trip.dates, trip.dates);
    }

    #[tokio::test]
    async fn insert_for_another_trip_is_refused() {
        let store = InMemoryTripStore::new();
        let trip = Trip::new("Italy", range("2026-06-01", "2026-06-10"));
        store.create_trip(&trip).await.unwrap();

        let stray = Segment {
            id: Uuid::new_v4(),
            trip_id: Uuid::new_v4(),
            place_name: "Rome".to_string(),
            dates: trip.dates,
            notes: None,
        };
        let result = store
            .apply(TripBatch::new(trip.id).push(BatchOp::InsertSegment(stray)))
            .await;
        assert!(result.is_err());
        assert!(store
            .load_trip(trip.id)
            .await
            .unwrap()
            .unwrap()
            .segments
            .is_empty());
    }

    #[tokio::test]
    async fn segments_load_in_start_order() {
        let store = InMemoryTripStore::new();
        let trip = Trip::new("Italy", range("2026-06-01", "2026-06-10"));
        store.create_trip(&trip).await.unwrap();

        let late = Segment {
            id: Uuid::new_v4(),
            trip_id: trip.id,
            place_name: "Lake Como".to_string(),
            dates: range("2026-06-06", "2026-06-10"),
            notes: None,
        };
        let early = Segment {
            id: Uuid::new_v4(),
            place_name: "Rome".to_string(),
            dates: range("2026-06-01", "2026-06-05"),
            ..late.clone()
        };
        store
            .apply(
                TripBatch::new(trip.id)
                    .push(BatchOp::InsertSegment(late))
                    .push(BatchOp::InsertSegment(early)),
            )
            .await
            .unwrap();

        let loaded = store.load_trip(trip.id).await.unwrap().unwrap();
        let places: Vec<&str> = loaded.segments.iter().map(|s| s.place_name.as_str()).collect();
        assert_eq!(places, vec!["Rome", "Lake Como"]);
    }
}
