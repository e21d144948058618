//! Trip-relative day numbers. Day 1 is the trip's first date.

use chrono::{NaiveDate, TimeDelta};

/// 1-based position of `date` relative to `trip_start`. Dates before the
/// trip give zero or negative numbers.
pub fn day_number(trip_start: NaiveDate, date: NaiveDate) -> i64 {
    (date - trip_start).num_days() + 1
}

/// Calendar date of day `day` of a trip starting on `trip_start`.
///
/// Returns `None` only when the result falls outside the representable
/// calendar.
pub fn date_for_day(trip_start: NaiveDate, day: i64) -> Option<NaiveDate> {
    let offset = TimeDelta::try_days(day.checked_sub(1)?)?;
    trip_start.checked_add_signed(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> NaiveDate {
        tripboard_schema::parse_date(raw).unwrap()
    }

    #[test]
    fn first_day_is_one() {
        let start = date("2026-06-01");
        assert_eq!(day_number(start, start), 1);
        assert_eq!(date_for_day(start, 1), Some(start));
    }

    #[test]
    fn crosses_month_and_leap_boundaries() {
        let start = date("2028-02-27");
        assert_eq!(day_number(start, date("2028-03-01")), 4);
        assert_eq!(date_for_day(start, 3), Some(date("2028-02-29")));
    }

    #[test]
    fn dates_before_start_are_not_positive() {
        let start = date("2026-06-01");
        assert_eq!(day_number(start, date("2026-05-31")), 0);
        assert_eq!(day_number(start, date("2026-05-30")), -1);
        assert_eq!(date_for_day(start, 0), Some(date("2026-05-31")));
    }

    #[test]
    fn day_number_inverts_date_for_day() {
        let starts = ["2026-06-01", "2024-12-30", "2028-02-28", "1999-12-31"];
        for start in starts.map(date) {
            for n in (1..=400).chain([1_000, 10_000, 100_000]) {
                let day = date_for_day(start, n).unwrap();
                assert_eq!(day_number(start, day), n, "start {start} day {n}");
            }
        }
    }

    #[test]
    fn date_for_day_inverts_day_number() {
        let start = date("2026-06-01");
        let mut day = start;
        for _ in 0..800 {
            assert_eq!(date_for_day(start, day_number(start, day)), Some(day));
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn overflowing_day_numbers_yield_none() {
        let start = date("2026-06-01");
        assert_eq!(date_for_day(start, i64::MAX), None);
        assert_eq!(date_for_day(start, i64::MIN), None);
    }
}
