//! Week and minute arithmetic shared by the store and the scheduler.
//!
//! All three consumers of week boundaries (task creation, daily digest,
//! rollover) must agree on what "this week" means, so the Monday computation
//! lives here and nowhere else.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// The Monday anchoring the week that contains `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Drop seconds and sub-second precision; scheduling works at minute
/// resolution throughout.
pub fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt)
}

/// [`truncate_to_minute`] for a bare time of day.
pub fn truncate_time_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_start_is_monday_for_every_weekday() {
        let monday = d(2024, 6, 3);
        for offset in 0..7 {
            let day = monday + Duration::days(offset);
            assert_eq!(week_start(day), monday, "offset {offset}");
        }
    }

    #[test]
    fn week_start_is_idempotent() {
        for offset in 0..60 {
            let day = d(2024, 6, 1) + Duration::days(offset);
            assert_eq!(week_start(week_start(day)), week_start(day));
        }
    }

    #[test]
    fn week_start_crosses_month_and_year_boundaries() {
        // 2024-01-01 is a Monday; 2023-12-31 (Sunday) belongs to the prior week.
        assert_eq!(week_start(d(2024, 1, 1)), d(2024, 1, 1));
        assert_eq!(week_start(d(2023, 12, 31)), d(2023, 12, 25));
    }

    #[test]
    fn truncate_drops_seconds() {
        let dt = d(2024, 6, 10).and_time(NaiveTime::from_hms_opt(9, 0, 42).unwrap());
        let truncated = truncate_to_minute(dt);
        assert_eq!(truncated.time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(truncate_to_minute(truncated), truncated);

        let time = NaiveTime::from_hms_milli_opt(9, 0, 42, 500).unwrap();
        assert_eq!(
            truncate_time_to_minute(time),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
    }
}
