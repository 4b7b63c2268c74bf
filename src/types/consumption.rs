//! Consumption records, owner profiles and identifiers

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{HydroError, Result};

static OBJECT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("valid regex"));

/// 12-byte identifier rendered as 24 lowercase hex characters.
///
/// Owners and records share this format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

pub type OwnerId = ObjectId;
pub type RecordId = ObjectId;

impl ObjectId {
    /// Parse a 24-hex-character identifier. Returns None for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        if OBJECT_ID_RE.is_match(raw) {
            Some(Self(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// Parse an owner identifier, failing with `InvalidOwnerId`.
    pub fn parse_owner(raw: &str) -> Result<Self> {
        Self::parse(raw).ok_or_else(|| HydroError::InvalidOwnerId(raw.to_string()))
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        let mut hex = String::with_capacity(24);
        for b in bytes {
            hex.push_str(&format!("{:02x}", b));
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = HydroError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
            .ok_or_else(|| HydroError::Parse(format!("invalid object id: {:?}", value)))
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

/// A stored consumption event. Immutable once inserted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRecord {
    pub id: RecordId,
    pub owner_id: OwnerId,
    pub volume: f64,
    pub cup_count: u64,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ConsumptionRecord {
    /// Calendar date of `occurred_at` in the process-local timezone.
    pub fn local_date(&self) -> NaiveDate {
        self.occurred_at.with_timezone(&Local).date_naive()
    }
}

/// Caller-supplied fields for a record that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub owner_id: String,
    pub volume: f64,
    pub cup_count: u64,
    /// Defaults to the insert time when absent
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewRecord {
    /// Validate caller input and stamp the record with its id and creation time.
    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> Result<ConsumptionRecord> {
        let owner_id = ObjectId::parse_owner(&self.owner_id)?;

        if !self.volume.is_finite() {
            return Err(HydroError::InvalidRecord(format!(
                "volume must be a finite number, got {}",
                self.volume
            )));
        }
        if self.volume < 0.0 {
            return Err(HydroError::InvalidRecord(format!(
                "volume must not be negative, got {}",
                self.volume
            )));
        }

        Ok(ConsumptionRecord {
            id,
            owner_id,
            volume: self.volume,
            cup_count: self.cup_count,
            occurred_at: self.occurred_at.unwrap_or(created_at),
            created_at,
        })
    }
}

/// Owner profile, including the per-user consumption goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: OwnerId,
    pub username: String,
    pub email: String,
    pub goal: f64,
}

/// One row of a grouped range query: totals for a single local calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayTotals {
    pub date: NaiveDate,
    pub total_volume: f64,
    pub total_cup_count: u64,
}

impl DayTotals {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_volume: 0.0,
            total_cup_count: 0,
        }
    }

    pub fn add(&mut self, record: &ConsumptionRecord) {
        self.total_volume += record.volume;
        self.total_cup_count = self.total_cup_count.saturating_add(record.cup_count);
    }
}
