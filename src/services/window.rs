//! Window calculator: start/end instants of the three report windows

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone};

use crate::types::{Window, WindowKind};

/// Step used to find the first valid instant of a day whose midnight was
/// skipped by a DST transition
const DST_STEP_MINUTES: i64 = 15;

/// First local instant of `date`.
///
/// Ambiguous midnights resolve to the earlier instant; a midnight skipped by
/// spring-forward resolves to the first instant that exists that day.
pub fn local_midnight(date: NaiveDate) -> DateTime<Local> {
    local_midnight_in(&Local, date)
}

/// [`local_midnight`] in an explicit timezone
pub fn local_midnight_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earlier, _) => earlier,
        LocalResult::None => (1..=24 * 60 / DST_STEP_MINUTES)
            .find_map(|step| {
                tz.from_local_datetime(&(midnight + Duration::minutes(step * DST_STEP_MINUTES)))
                    .earliest()
            })
            .unwrap_or_else(|| tz.from_utc_datetime(&midnight)),
    }
}

/// Last representable local instant of `date` (next midnight minus 1ns)
pub fn end_of_day(date: NaiveDate) -> DateTime<Local> {
    end_of_day_in(&Local, date)
}

pub fn end_of_day_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    match date.succ_opt() {
        Some(next) => local_midnight_in(tz, next) - Duration::nanoseconds(1),
        None => local_midnight_in(tz, date) + Duration::days(1) - Duration::nanoseconds(1),
    }
}

/// Start and end of the `kind` window ending with `today`, in `tz`
pub fn window_bounds_in<Tz: TimeZone>(
    tz: &Tz,
    today: NaiveDate,
    kind: WindowKind,
) -> (DateTime<Tz>, DateTime<Tz>) {
    let first_day = today - Duration::days(i64::from(kind.days()) - 1);
    (local_midnight_in(tz, first_day), end_of_day_in(tz, today))
}

/// Trailing window of `kind.days()` calendar days ending with `now`'s day.
pub fn window_for(now: DateTime<Local>, kind: WindowKind) -> Window {
    let (start, end) = window_bounds_in(&Local, now.date_naive(), kind);
    Window { start, end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;
    use crate::services::buckets::buckets_for_dates;
    use chrono::{Offset, Timelike};

    fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(year, month, day, hour, min, 0)
            .single()
            .unwrap()
    }

    #[test]
    fn test_day_window() {
        let now = at(2024, 6, 10, 15, 42);
        let window = window_for(now, WindowKind::Day);

        assert_eq!(window.start, at(2024, 6, 10, 0, 0));
        assert_eq!(window.end.date_naive(), now.date_naive());
        assert_eq!(window.end.hour(), 23);
        assert_eq!(window.end.minute(), 59);
        assert_eq!(window.end.second(), 59);
        assert_eq!(window.end.nanosecond(), 999_999_999);
    }

    #[test]
    fn test_week_window_is_trailing_seven_days() {
        // 2024-06-12 is a Wednesday: not aligned to an ISO week
        let now = at(2024, 6, 12, 8, 0);
        let window = window_for(now, WindowKind::Week);

        assert_eq!(window.start, at(2024, 6, 6, 0, 0));
        assert_eq!(window.end_date(), NaiveDate::from_ymd_opt(2024, 6, 12).unwrap());
    }

    #[test]
    fn test_month_window_is_trailing_thirty_days() {
        let now = at(2024, 6, 20, 23, 59);
        let window = window_for(now, WindowKind::Month);

        assert_eq!(window.start, at(2024, 5, 22, 0, 0));
        assert_eq!(window.end_date(), NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
    }

    #[test]
    fn test_month_window_crosses_year_boundary() {
        let now = at(2024, 1, 10, 12, 0);
        let window = window_for(now, WindowKind::Month);
        assert_eq!(window.start_date(), NaiveDate::from_ymd_opt(2023, 12, 12).unwrap());
    }

    #[test]
    fn test_week_window_crosses_leap_day() {
        let now = at(2024, 3, 2, 12, 0);
        let window = window_for(now, WindowKind::Week);
        assert_eq!(window.start_date(), NaiveDate::from_ymd_opt(2024, 2, 25).unwrap());
    }

    #[test]
    fn test_now_at_midnight_and_last_instant_share_window() {
        let midnight = at(2024, 6, 10, 0, 0);
        let last = end_of_day(midnight.date_naive());
        assert_eq!(
            window_for(midnight, WindowKind::Week),
            window_for(last, WindowKind::Week)
        );
    }

    #[test]
    fn test_end_of_day_is_one_nanosecond_before_next_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let next = local_midnight(date.succ_opt().unwrap());
        assert_eq!(next - end_of_day(date), Duration::nanoseconds(1));
    }

    #[test]
    fn test_local_midnight_is_on_requested_date() {
        // Holds even on DST transition days in the host timezone
        let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for _ in 0..366 {
            assert_eq!(local_midnight(date).date_naive(), date);
            date = date.succ_opt().unwrap();
        }
    }

    // ========== fixed-zone DST tests ==========

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn offset_hours<Tz: TimeZone>(dt: &DateTime<Tz>) -> i32 {
        dt.offset().fix().local_minus_utc() / 3600
    }

    fn bucket_count<Tz: TimeZone>(tz: &Tz, today: NaiveDate, kind: WindowKind) -> usize {
        let (start, end) = window_bounds_in(tz, today, kind);
        buckets_for_dates(start.date_naive(), end.date_naive(), kind, Locale::En).len()
    }

    #[test]
    fn test_skipped_midnight_resolves_to_first_valid_instant() {
        // Sao Paulo jumped from 00:00 to 01:00 on 2018-11-04
        let tz = chrono_tz::America::Sao_Paulo;
        let date = ymd(2018, 11, 4);

        let start = local_midnight_in(&tz, date);
        assert_eq!(start.date_naive(), date);
        assert_eq!((start.hour(), start.minute()), (1, 0));
        assert_eq!(offset_hours(&start), -2);

        // the day before ends one nanosecond before that instant, still at -03:00
        let prev_end = end_of_day_in(&tz, ymd(2018, 11, 3));
        assert_eq!(start - prev_end, Duration::nanoseconds(1));
        assert_eq!(prev_end.date_naive(), ymd(2018, 11, 3));
        assert_eq!(offset_hours(&prev_end), -3);

        // 23-hour day
        let end = end_of_day_in(&tz, date);
        assert_eq!(end - start + Duration::nanoseconds(1), Duration::hours(23));
    }

    #[test]
    fn test_ambiguous_midnight_resolves_to_earlier_instant() {
        // Havana fell back from 01:00 to 00:00 on 2018-11-04, so 00:00 occurs twice
        let tz = chrono_tz::America::Havana;
        let date = ymd(2018, 11, 4);

        let start = local_midnight_in(&tz, date);
        assert_eq!((start.hour(), start.minute()), (0, 0));
        assert_eq!(offset_hours(&start), -4);

        // 25-hour day
        let end = end_of_day_in(&tz, date);
        assert_eq!(end.date_naive(), date);
        assert_eq!(offset_hours(&end), -5);
        assert_eq!(end - start + Duration::nanoseconds(1), Duration::hours(25));
    }

    #[test]
    fn test_window_sizes_across_dst_transitions() {
        let sao_paulo = chrono_tz::America::Sao_Paulo;
        let havana = chrono_tz::America::Havana;
        let days = [
            ymd(2018, 2, 17),
            ymd(2018, 2, 18),
            ymd(2018, 11, 4),
            ymd(2018, 11, 5),
            ymd(2018, 11, 10),
        ];

        for today in days {
            for (kind, expected) in [
                (WindowKind::Day, 1),
                (WindowKind::Week, 7),
                (WindowKind::Month, 30),
            ] {
                assert_eq!(bucket_count(&sao_paulo, today, kind), expected, "{} {:?}", today, kind);
                assert_eq!(bucket_count(&havana, today, kind), expected, "{} {:?}", today, kind);
            }
        }
    }

    #[test]
    fn test_week_window_spanning_spring_forward() {
        let tz = chrono_tz::America::Sao_Paulo;
        let (start, end) = window_bounds_in(&tz, ymd(2018, 11, 4), WindowKind::Week);

        assert_eq!(start.date_naive(), ymd(2018, 10, 29));
        assert_eq!((start.hour(), offset_hours(&start)), (0, -3));
        assert_eq!(end.date_naive(), ymd(2018, 11, 4));
        assert_eq!(end.nanosecond(), 999_999_999);
        assert_eq!(offset_hours(&end), -2);
    }
}
