//! Bucket generator: one empty bucket per calendar day of a window

use chrono::{Datelike, NaiveDate};

use crate::config::Locale;
use crate::types::{Bucket, Window, WindowKind};

/// Dense, oldest-first list of zeroed buckets covering `[start, end]`.
///
/// Weekly buckets carry the weekday name in `locale`.
pub fn generate_buckets(window: &Window, kind: WindowKind, locale: Locale) -> Vec<Bucket> {
    buckets_for_dates(window.start_date(), window.end_date(), kind, locale)
}

pub(crate) fn buckets_for_dates(
    first: NaiveDate,
    last: NaiveDate,
    kind: WindowKind,
    locale: Locale,
) -> Vec<Bucket> {
    first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| {
            let day_of_week = match kind {
                WindowKind::Week => Some(locale.weekday_name(date.weekday()).to_string()),
                WindowKind::Day | WindowKind::Month => None,
            };
            Bucket::empty(date, day_of_week)
        })
        .collect()
}
