//! `hydrotrack daily|weekly|monthly` report output

use std::fmt::Write as _;

use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use crate::services::{local_midnight, RollupService};
use crate::types::{Report, Result, WindowKind};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Owner id (24 hex characters)
    #[arg(value_name = "OWNER_ID")]
    pub owner: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Compute the report as of this local date instead of today
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    status: u16,
    kind: &'a str,
}

impl ReportArgs {
    pub fn run(self, service: &RollupService, kind: WindowKind) -> Result<()> {
        let result = match self.as_of {
            Some(date) => service.report_at(&self.owner, kind, local_midnight(date)),
            None => service.report(&self.owner, kind),
        };

        match (result, self.json) {
            (Ok(report), true) => {
                let json = serde_json::to_string_pretty(&report)?;
                println!("{}", json);
                Ok(())
            }
            (Ok(report), false) => {
                print!("{}", render_text(&report));
                Ok(())
            }
            (Err(err), true) => {
                let body = ErrorBody {
                    error: err.to_string(),
                    status: err.status_code(),
                    kind: kind.label(),
                };
                if let Ok(json) = serde_json::to_string_pretty(&body) {
                    println!("{}", json);
                }
                Err(err)
            }
            (Err(err), false) => Err(err),
        }
    }
}

/// Plain-text table for a report
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} consumption for {} ({} → {})",
        report.kind.label(),
        report.profile.username,
        report.window_start.date_naive(),
        report.window_end.date_naive()
    );

    let show_weekday = report.buckets.iter().any(|b| b.day_of_week.is_some());
    if show_weekday {
        let _ = writeln!(out, "{:<12}{:<12}{:>10}{:>6}", "Date", "Day", "Volume", "Cups");
    } else {
        let _ = writeln!(out, "{:<12}{:>10}{:>6}", "Date", "Volume", "Cups");
    }

    for bucket in &report.buckets {
        let date = bucket.date.to_string();
        if show_weekday {
            let day = bucket.day_of_week.as_deref().unwrap_or("");
            let _ = writeln!(
                out,
                "{:<12}{:<12}{:>10.1}{:>6}",
                date, day, bucket.total_volume, bucket.total_cup_count
            );
        } else {
            let _ = writeln!(
                out,
                "{:<12}{:>10.1}{:>6}",
                date, bucket.total_volume, bucket.total_cup_count
            );
        }
    }

    let pad = if show_weekday { 24 } else { 12 };
    let _ = writeln!(
        out,
        "{:<pad$}{:>10.1}{:>6}",
        "Total",
        report.totals.total_volume,
        report.totals.total_cup_count,
        pad = pad
    );

    match report.goal_progress() {
        Some(progress) => {
            let _ = writeln!(
                out,
                "Goal {:.1}/day: {:.0}% of target, met on {} of {} day(s)",
                report.profile.goal,
                progress * 100.0,
                report.days_goal_met(),
                report.buckets.len()
            );
        }
        None => {
            let _ = writeln!(out, "No goal set");
        }
    }

    out
}
