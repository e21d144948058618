use std::sync::Arc;

use tempfile::TempDir;
use tripboard_core::{BatchOp, PlanError, TripBatch, TripPlanner, TripStore};
use tripboard_schema::{Segment, SegmentDraft, Trip, TripDateRange};
use tripboard_store::SqliteStore;
use uuid::Uuid;

fn range(start: &str, end: &str) -> TripDateRange {
    TripDateRange::parse(start, end).unwrap()
}

fn draft(place: &str, start: &str, end: &str) -> SegmentDraft {
    SegmentDraft {
        place_name: place.to_string(),
        dates: range(start, end),
        notes: None,
    }
}

#[tokio::test]
async fn data_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("data/tripboard.db");

    let trip_id = {
        let planner = TripPlanner::new(Arc::new(SqliteStore::open(&path).unwrap()));
        let trip = planner
            .create_trip("Italy", range("2026-06-01", "2026-06-10"))
            .await
            .unwrap();
        planner
            .create_segment(
                trip.id,
                SegmentDraft {
                    notes: Some("near the Pantheon".to_string()),
                    ..draft("Rome", "2026-06-01", "2026-06-05")
                },
            )
            .await
            .unwrap();
        trip.id
    };

    let store = SqliteStore::open(&path).unwrap();
    let loaded = store.load_trip(trip_id).await.unwrap().unwrap();
    assert_eq!(loaded.trip.title, "Italy");
    assert_eq!(loaded.segments.len(), 1);
    assert_eq!(loaded.segments[0].dates, range("2026-06-01", "2026-06-05"));
    assert_eq!(loaded.segments[0].notes.as_deref(), Some("near the Pantheon"));
}

#[tokio::test]
async fn segments_come_back_ordered_by_start() {
    let store = SqliteStore::open_in_memory().unwrap();
    let planner = TripPlanner::new(Arc::new(store.clone()));
    let trip = planner
        .create_trip("Italy", range("2026-06-01", "2026-06-10"))
        .await
        .unwrap();

    for (place, start, end) in [
        ("Venice", "2026-06-08", "2026-06-10"),
        ("Rome", "2026-06-01", "2026-06-03"),
        ("Florence", "2026-06-04", "2026-06-07"),
    ] {
        planner
            .create_segment(trip.id, draft(place, start, end))
            .await
            .unwrap();
    }

    let loaded = store.load_trip(trip.id).await.unwrap().unwrap();
    let places: Vec<&str> = loaded.segments.iter().map(|s| s.place_name.as_str()).collect();
    assert_eq!(places, vec!["Rome", "Florence", "Venice"]);
}

#[tokio::test]
async fn shrinking_trip_commits_clamp_and_delete_together() {
    let store = SqliteStore::open_in_memory().unwrap();
    let planner = TripPlanner::new(Arc::new(store.clone()));
    let trip = planner
        .create_trip("Italy", range("2026-06-01", "2026-06-10"))
        .await
        .unwrap();
    let rome = planner
        .create_segment(trip.id, draft("Rome", "2026-06-01", "2026-06-05"))
        .await
        .unwrap();
    planner
        .create_segment(trip.id, draft("Lake Como", "2026-06-06", "2026-06-10"))
        .await
        .unwrap();

    planner
        .update_trip_dates(trip.id, range("2026-06-01", "2026-06-04"))
        .await
        .unwrap();

    let loaded = store.load_trip(trip.id).await.unwrap().unwrap();
    assert_eq!(loaded.trip.dates, range("2026-06-01", "2026-06-04"));
    assert_eq!(loaded.segments.len(), 1);
    assert_eq!(loaded.segments[0].id, rome.id);
    assert_eq!(loaded.segments[0].dates, range("2026-06-01", "2026-06-04"));
}

#[tokio::test]
async fn failing_op_rolls_back_earlier_ops() {
    let store = SqliteStore::open_in_memory().unwrap();
    let trip = Trip::new("Italy", range("2026-06-01", "2026-06-10"));
    store.create_trip(&trip).await.unwrap();

    let rome = Segment {
        id: Uuid::new_v4(),
        trip_id: trip.id,
        place_name: "Rome".to_string(),
        dates: range("2026-06-01", "2026-06-05"),
        notes: None,
    };
    let batch = TripBatch::new(trip.id)
        .push(BatchOp::SetTripDates(range("2026-06-01", "2026-06-04")))
        .push(BatchOp::InsertSegment(rome))
        .push(BatchOp::DeleteSegment(Uuid::new_v4()));
    assert!(store.apply(batch).await.is_err());

    let loaded = store.load_trip(trip.id).await.unwrap().unwrap();
    assert_eq!(loaded.trip.dates, trip.dates);
    assert!(loaded.segments.is_empty());
}

#[tokio::test]
async fn deleting_trip_cascades_to_segments() {
    let store = SqliteStore::open_in_memory().unwrap();
    let planner = TripPlanner::new(Arc::new(store.clone()));
    let trip = planner
        .create_trip("Italy", range("2026-06-01", "2026-06-10"))
        .await
        .unwrap();
    let rome = planner
        .create_segment(trip.id, draft("Rome", "2026-06-01", "2026-06-05"))
        .await
        .unwrap();

    planner.delete_trip(trip.id).await.unwrap();

    assert!(store.find_segment(rome.id).await.unwrap().is_none());
    assert!(matches!(
        planner.delete_segment(rome.id).await.unwrap_err(),
        PlanError::NotFound { .. }
    ));
}

#[tokio::test]
async fn list_trips_orders_by_start_date() {
    let store = SqliteStore::open_in_memory().unwrap();
    let planner = TripPlanner::new(Arc::new(store));
    planner
        .create_trip("Autumn", range("2026-10-01", "2026-10-05"))
        .await
        .unwrap();
    planner
        .create_trip("Summer", range("2026-06-01", "2026-06-10"))
        .await
        .unwrap();

    let titles: Vec<String> = planner
        .list_trips()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["Summer", "Autumn"]);
}
