//! Report types produced by the rollup engine

use chrono::{DateTime, Local, NaiveDate};
use serde::{Serialize, Serializer};

use super::{DayTotals, UserProfile};

/// Which fixed window a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// Today only
    Day,
    /// Trailing 7 days ending today (not an ISO week)
    Week,
    /// Trailing 30 days ending today (not a calendar month)
    Month,
}

impl WindowKind {
    /// Number of calendar days (and therefore buckets) in the window
    pub fn days(self) -> u32 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "Daily",
            Self::Week => "Weekly",
            Self::Month => "Monthly",
        }
    }
}

/// Inclusive time range `[start, end]` in the local calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl Window {
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }
}

/// One day's totals inside a report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub date: NaiveDate,
    /// Localized weekday name, weekly reports only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
    pub total_volume: f64,
    pub total_cup_count: u64,
}

impl Bucket {
    pub fn empty(date: NaiveDate, day_of_week: Option<String>) -> Self {
        Self {
            date,
            day_of_week,
            total_volume: 0.0,
            total_cup_count: 0,
        }
    }

    /// Overwrite the zero totals with a grouped row for the same date
    pub fn fill(&mut self, totals: &DayTotals) {
        self.total_volume = totals.total_volume;
        self.total_cup_count = totals.total_cup_count;
    }
}

/// Sum over every bucket of a report
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub total_volume: f64,
    pub total_cup_count: u64,
}

impl ReportTotals {
    pub fn from_buckets(buckets: &[Bucket]) -> Self {
        buckets.iter().fold(Self::default(), |mut acc, b| {
            acc.total_volume += b.total_volume;
            acc.total_cup_count = acc.total_cup_count.saturating_add(b.total_cup_count);
            acc
        })
    }
}

/// Dense, gap-filled consumption summary for one owner and one window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub kind: WindowKind,
    #[serde(serialize_with = "serialize_local_date")]
    pub window_start: DateTime<Local>,
    #[serde(serialize_with = "serialize_local_date")]
    pub window_end: DateTime<Local>,
    pub buckets: Vec<Bucket>,
    pub totals: ReportTotals,
    pub profile: UserProfile,
}

impl Report {
    /// Window total as a fraction of the daily goal summed over every bucket.
    /// None when the owner has no goal.
    pub fn goal_progress(&self) -> Option<f64> {
        let target = self.profile.goal * self.buckets.len() as f64;
        if target > 0.0 {
            Some(self.totals.total_volume / target)
        } else {
            None
        }
    }

    /// Buckets whose volume reached the daily goal
    pub fn days_goal_met(&self) -> usize {
        if self.profile.goal <= 0.0 {
            return 0;
        }
        self.buckets
            .iter()
            .filter(|b| b.total_volume >= self.profile.goal)
            .count()
    }
}

fn serialize_local_date<S: Serializer>(
    instant: &DateTime<Local>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    instant.date_naive().serialize(serializer)
}
