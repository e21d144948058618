//! Exhaustive checks over every small date range inside a two-week window.

use chrono::{NaiveDate, TimeDelta};
use tripboard_core::{clamp_dates, reconcile, validate_candidate, PlanError};
use tripboard_schema::{Segment, TripDateRange};
use uuid::Uuid;

fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap() + TimeDelta::days(n)
}

fn span(a: i64, b: i64) -> TripDateRange {
    TripDateRange::new(day(a), day(b))
}

fn segment(place: &str, a: i64, b: i64) -> Segment {
    Segment {
        id: Uuid::new_v4(),
        trip_id: Uuid::nil(),
        place_name: place.to_string(),
        dates: span(a, b),
        notes: None,
    }
}

const WINDOW: i64 = 14;

#[test]
fn invalid_range_iff_start_after_end() {
    let trip = span(0, WINDOW);
    for a in -2..=WINDOW + 2 {
        for b in -2..=WINDOW + 2 {
            let result = validate_candidate(&trip, &[], &span(a, b), None);
            let invalid = matches!(result, Err(PlanError::InvalidRange { .. }));
            assert_eq!(invalid, a > b, "candidate {a}..{b}");
        }
    }
}

#[test]
fn out_of_bounds_iff_any_day_outside_trip() {
    let trip = span(3, 10);
    for a in 0..=WINDOW {
        for b in a..=WINDOW {
            let result = validate_candidate(&trip, &[], &span(a, b), None);
            let outside = (a..=b).any(|d| d < 3 || d > 10);
            assert_eq!(
                matches!(result, Err(PlanError::OutOfTripBounds { .. })),
                outside,
                "candidate {a}..{b}"
            );
            assert_eq!(result.is_ok(), !outside);
        }
    }
}

#[test]
fn overlap_iff_closed_ranges_share_a_day() {
    let trip = span(0, WINDOW);
    for a in 0..=WINDOW {
        for b in a..=WINDOW {
            for c in 0..=WINDOW {
                for d in c..=WINDOW {
                    let existing = segment("existing", c, d);
                    let result = validate_candidate(&trip, &[existing], &span(a, b), None);
                    let shares_day = a <= d && c <= b;
                    assert_eq!(
                        matches!(result, Err(PlanError::OverlapsSegment { .. })),
                        shares_day,
                        "{a}..{b} against {c}..{d}"
                    );
                }
            }
        }
    }
}

/// Every way to place up to two disjoint segments in the window.
fn valid_layouts() -> Vec<Vec<Segment>> {
    let mut layouts = vec![Vec::new()];
    for a in 0..=WINDOW {
        for b in a..=WINDOW {
            layouts.push(vec![segment("first", a, b)]);
            for c in b + 1..=WINDOW {
                for d in c..=WINDOW {
                    layouts.push(vec![segment("first", a, b), segment("second", c, d)]);
                }
            }
        }
    }
    layouts
}

#[test]
fn reconcile_to_same_range_is_noop() {
    let trip = span(0, WINDOW);
    for segments in valid_layouts() {
        let plan = reconcile(&trip, &trip, &segments).unwrap();
        assert!(plan.is_noop());
        assert_eq!(plan.survivors, segments);
    }
}

#[test]
fn reconcile_of_valid_layout_keeps_invariants() {
    let old = span(0, WINDOW);
    let new_ranges = [span(0, 3), span(4, 9), span(9, 9), span(12, WINDOW), span(-3, 20)];
    for segments in valid_layouts().into_iter().step_by(7) {
        for new in &new_ranges {
            let plan = reconcile(&old, new, &segments).unwrap();

            for survivor in &plan.survivors {
                assert!(new.contains(&survivor.dates));
                assert!(survivor.dates.is_well_formed());
            }
            for pair in plan.survivors.windows(2) {
                assert!(!pair[0].dates.overlaps(&pair[1].dates));
            }
            assert_eq!(plan.survivors.len() + plan.deleted.len(), segments.len());
            for gone in &plan.deleted {
                assert!(!gone.dates.overlaps(new));
            }
        }
    }
}

#[test]
fn clamp_is_intersection_for_overlapping_ranges() {
    let bounds = span(4, 9);
    for a in 0..=WINDOW {
        for b in a..=WINDOW {
            let clamped = clamp_dates(&span(a, b), &bounds);
            let expected = (a <= 9 && 4 <= b).then(|| span(a.max(4), b.min(9)));
            assert_eq!(clamped, expected, "{a}..{b}");
        }
    }
}
