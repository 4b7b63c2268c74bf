//! Rollup service: daily, weekly and monthly consumption reports
//!
//! One report needs two independent reads: the grouped range query and
//! the profile fetch. Both run concurrently via `rayon::join` and the
//! merge waits for both. A missing profile fails the whole report, even
//! when aggregation succeeded.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::debug;

use super::aggregator::Aggregator;
use super::buckets::generate_buckets;
use super::window::window_for;
use crate::config::Config;
use crate::store::{ProfileStore, RecordStore};
use crate::types::{HydroError, Report, ReportTotals, Result, WindowKind};

pub struct RollupService {
    records: Arc<dyn RecordStore>,
    profiles: Arc<dyn ProfileStore>,
    config: Config,
}

impl RollupService {
    pub fn new(
        records: Arc<dyn RecordStore>,
        profiles: Arc<dyn ProfileStore>,
        config: Config,
    ) -> Self {
        Self {
            records,
            profiles,
            config,
        }
    }

    /// Today's report (one bucket)
    pub fn daily_report(&self, owner: &str) -> Result<Report> {
        self.report(owner, WindowKind::Day)
    }

    /// Trailing 7-day report (seven buckets)
    pub fn weekly_report(&self, owner: &str) -> Result<Report> {
        self.report(owner, WindowKind::Week)
    }

    /// Trailing 30-day report (thirty buckets)
    pub fn monthly_report(&self, owner: &str) -> Result<Report> {
        self.report(owner, WindowKind::Month)
    }

    pub fn report(&self, owner: &str, kind: WindowKind) -> Result<Report> {
        self.report_at(owner, kind, Local::now())
    }

    /// Build a report relative to an explicit reference instant
    pub fn report_at(&self, owner: &str, kind: WindowKind, now: DateTime<Local>) -> Result<Report> {
        let owner = Aggregator::validate_owner(owner)?;
        let window = window_for(now, kind);
        let buckets = generate_buckets(&window, kind, self.config.locale);

        let (groups, profile) = rayon::join(
            || Aggregator::day_totals(self.records.as_ref(), &owner, &window),
            || self.profiles.find_by_id(&owner),
        );
        let groups = groups?;
        let profile = profile?.ok_or_else(|| HydroError::OwnerNotFound(owner.to_string()))?;

        let buckets = Aggregator::merge(buckets, &groups);
        let totals = ReportTotals::from_buckets(&buckets);

        debug!(
            %owner,
            kind = kind.label(),
            buckets = buckets.len(),
            total_volume = totals.total_volume,
            "report assembled"
        );

        Ok(Report {
            kind,
            window_start: window.start,
            window_end: window.end,
            buckets,
            totals,
            profile,
        })
    }
}
