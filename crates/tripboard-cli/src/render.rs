use std::fmt::Write;

use tripboard_core::{Itinerary, ReconcilePlan};
use tripboard_schema::Trip;

pub fn trip_table(trips: &[Trip]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<38} {:<24} {:<6} {}", "TRIP ID", "DATES", "DAYS", "TITLE");
    let _ = writeln!(out, "{}", "-".repeat(80));
    for trip in trips {
        let _ = writeln!(
            out,
            "{:<38} {:<24} {:<6} {}",
            trip.id.to_string(),
            trip.dates.to_string(),
            trip.dates.num_days(),
            trip.title
        );
    }
    out
}

pub fn itinerary(itinerary: &Itinerary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}, {} days)",
        itinerary.trip.title, itinerary.trip.dates, itinerary.total_days
    );
    let _ = writeln!(out, "{:<10} {:<24} {}", "DAYS", "DATES", "PLACE");
    for entry in &itinerary.entries {
        let days = if entry.first_day == entry.last_day {
            entry.first_day.to_string()
        } else {
            format!("{}-{}", entry.first_day, entry.last_day)
        };
        let _ = writeln!(
            out,
            "{:<10} {:<24} {}",
            days,
            entry.segment.dates().to_string(),
            entry.segment.label()
        );
    }
    out
}

pub fn plan(plan: &ReconcilePlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Trip dates: {}", plan.dates);
    if plan.is_noop() {
        let _ = writeln!(out, "No segments affected.");
        return out;
    }
    for clamp in &plan.clamped {
        let _ = writeln!(out, "  clamped {}: {} -> {}", clamp.place_name, clamp.from, clamp.to);
    }
    for segment in &plan.deleted {
        let _ = writeln!(out, "  deleted {} ({})", segment.place_name, segment.dates);
    }
    out
}
