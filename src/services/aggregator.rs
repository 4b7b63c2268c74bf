//! Aggregator: grouped range query folded into dense buckets

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::store::RecordStore;
use crate::types::{Bucket, DayTotals, ObjectId, OwnerId, Result, Window};

/// Aggregator for per-day consumption totals
pub struct Aggregator;

impl Aggregator {
    /// Reject malformed owner ids before any store is touched
    pub fn validate_owner(raw: &str) -> Result<OwnerId> {
        ObjectId::parse_owner(raw)
    }

    /// Per-day totals for the owner inside the window (sparse, ascending).
    ///
    /// Range filtering happens in the store; nothing outside the window is
    /// fetched.
    pub fn day_totals(
        store: &dyn RecordStore,
        owner: &OwnerId,
        window: &Window,
    ) -> Result<Vec<DayTotals>> {
        let groups = store.range_group_by_day(owner, window.start, window.end)?;
        debug!(
            store = store.name(),
            %owner,
            start = %window.start,
            end = %window.end,
            days = groups.len(),
            "fetched day totals"
        );
        Ok(groups)
    }

    /// Fill dense buckets from sparse day totals. Days without a group stay zero.
    pub fn merge(mut buckets: Vec<Bucket>, groups: &[DayTotals]) -> Vec<Bucket> {
        let by_date: HashMap<NaiveDate, &DayTotals> = groups.iter().map(|g| (g.date, g)).collect();

        let mut matched = 0usize;
        for bucket in &mut buckets {
            if let Some(totals) = by_date.get(&bucket.date) {
                bucket.fill(totals);
                matched += 1;
            }
        }

        if matched != by_date.len() {
            warn!(
                groups = by_date.len(),
                matched, "store returned day totals outside the bucket range"
            );
        }

        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;
    use crate::services::buckets::generate_buckets;
    use crate::services::window::{end_of_day, local_midnight, window_for};
    use crate::store::MemoryStore;
    use crate::types::{HydroError, NewRecord, WindowKind};
    use chrono::{DateTime, Duration, Local, TimeZone, Utc};

    const OWNER: &str = "64b7f0c2a1e4d3b2c1a09f8e";

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 20, 14, 0, 0).single().unwrap()
    }

    fn add(store: &MemoryStore, volume: f64, cups: u64, at: DateTime<Local>) {
        store
            .insert(NewRecord {
                owner_id: OWNER.to_string(),
                volume,
                cup_count: cups,
                occurred_at: Some(at.with_timezone(&Utc)),
            })
            .unwrap();
    }

    fn run(store: &MemoryStore, kind: WindowKind) -> Vec<Bucket> {
        let window = window_for(now(), kind);
        let buckets = generate_buckets(&window, kind, Locale::En);
        let owner = Aggregator::validate_owner(OWNER).unwrap();
        let groups = Aggregator::day_totals(store, &owner, &window).unwrap();
        Aggregator::merge(buckets, &groups)
    }

    fn make_totals(date: NaiveDate, volume: f64, cups: u64) -> DayTotals {
        DayTotals {
            date,
            total_volume: volume,
            total_cup_count: cups,
        }
    }

    // ========== merge() tests ==========

    #[test]
    fn test_merge_fills_matching_dates_only() {
        let window = window_for(now(), WindowKind::Week);
        let buckets = generate_buckets(&window, WindowKind::Week, Locale::En);
        let groups = vec![
            make_totals(window.start_date(), 300.0, 1),
            make_totals(window.end_date(), 500.0, 2),
        ];

        let merged = Aggregator::merge(buckets, &groups);

        assert_eq!(merged.len(), 7);
        assert!((merged[0].total_volume - 300.0).abs() < f64::EPSILON);
        assert!((merged[6].total_volume - 500.0).abs() < f64::EPSILON);
        for bucket in &merged[1..6] {
            assert_eq!(bucket.total_volume, 0.0);
            assert_eq!(bucket.total_cup_count, 0);
        }
    }

    #[test]
    fn test_merge_empty_groups_keeps_zero_buckets() {
        let window = window_for(now(), WindowKind::Month);
        let buckets = generate_buckets(&window, WindowKind::Month, Locale::En);
        let merged = Aggregator::merge(buckets, &[]);
        assert_eq!(merged.len(), 30);
        assert!(merged.iter().all(|b| b.total_volume == 0.0));
    }

    // ========== day_totals() tests ==========

    #[test]
    fn test_validate_owner_rejects_malformed_id() {
        let err = Aggregator::validate_owner("not-an-id").unwrap_err();
        assert!(matches!(err, HydroError::InvalidOwnerId(_)));
        assert_eq!(
            Aggregator::validate_owner(&OWNER.to_uppercase()).unwrap().as_str(),
            OWNER
        );
    }

    #[test]
    fn test_day_totals_conserves_totals() {
        let store = MemoryStore::new();
        let today = now().date_naive();
        let mut expected_volume = 0.0;
        let mut expected_cups = 0;
        for offset in 0..30 {
            let day = local_midnight(today - Duration::days(offset));
            let volume = 100.0 + offset as f64;
            let cups = (offset % 3) as u64;
            add(&store, volume, cups, day + Duration::hours(8));
            add(&store, volume, cups, day + Duration::hours(19));
            expected_volume += 2.0 * volume;
            expected_cups += 2 * cups;
        }

        let buckets = run(&store, WindowKind::Month);

        let volume: f64 = buckets.iter().map(|b| b.total_volume).sum();
        let cups: u64 = buckets.iter().map(|b| b.total_cup_count).sum();
        assert!((volume - expected_volume).abs() < 1e-9);
        assert_eq!(cups, expected_cups);
    }

    #[test]
    fn test_day_totals_boundaries_inclusive() {
        let store = MemoryStore::new();
        let window = window_for(now(), WindowKind::Week);
        add(&store, 1.0, 1, window.start);
        add(&store, 2.0, 1, window.end);
        add(&store, 4.0, 1, window.start - Duration::microseconds(1));
        add(&store, 8.0, 1, window.end + Duration::microseconds(1));

        let buckets = run(&store, WindowKind::Week);

        assert!((buckets[0].total_volume - 1.0).abs() < f64::EPSILON);
        assert!((buckets[6].total_volume - 2.0).abs() < f64::EPSILON);
        let total: f64 = buckets.iter().map(|b| b.total_volume).sum();
        assert!((total - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_day_totals_groups_by_local_date() {
        let store = MemoryStore::new();
        let today = now().date_naive();
        add(&store, 100.0, 1, local_midnight(today));
        add(&store, 200.0, 1, end_of_day(today));

        let buckets = run(&store, WindowKind::Day);

        assert_eq!(buckets.len(), 1);
        assert!((buckets[0].total_volume - 300.0).abs() < f64::EPSILON);
        assert_eq!(buckets[0].total_cup_count, 2);
    }

    #[test]
    fn test_day_totals_sparse_data_gap_filled() {
        let store = MemoryStore::new();
        let today = now().date_naive();
        add(&store, 750.0, 3, local_midnight(today - Duration::days(15)) + Duration::hours(12));

        let buckets = run(&store, WindowKind::Month);

        assert_eq!(buckets.len(), 30);
        let non_zero: Vec<usize> = buckets
            .iter()
            .enumerate()
            .filter(|(_, b)| b.total_volume > 0.0)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(non_zero, vec![14]);
        assert_eq!(buckets[14].total_cup_count, 3);
    }
}
