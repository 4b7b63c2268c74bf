//! Record and profile store contracts and implementations
//!
//! The rollup engine only sees the two traits below. Any backend that can
//! answer a grouped range scan (in-memory index, relational `GROUP BY`,
//! document aggregation) can sit behind them.

mod json_file;
mod memory;
mod object_id;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use object_id::ObjectIdGenerator;

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::types::{
    ConsumptionRecord, DayTotals, NewRecord, OwnerId, RecordId, Result, UserProfile,
};

/// Persistence for consumption records
pub trait RecordStore: Send + Sync {
    /// Store name for logs (e.g., "memory")
    fn name(&self) -> &str;

    /// Validate and persist a new record, returning its assigned id
    fn insert(&self, record: NewRecord) -> Result<RecordId>;

    fn find_by_id(&self, id: &RecordId) -> Result<Option<ConsumptionRecord>>;

    /// Returns false when no record had that id
    fn delete_by_id(&self, id: &RecordId) -> Result<bool>;

    /// Every stored record, oldest `occurred_at` first
    fn find_all(&self) -> Result<Vec<ConsumptionRecord>>;

    /// Totals per local calendar day for the owner's records with
    /// `occurred_at` in `[start, end]`, ascending by date. Days without
    /// records are absent.
    fn range_group_by_day(
        &self,
        owner: &OwnerId,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Vec<DayTotals>>;
}

/// Read access to owner profiles
pub trait ProfileStore: Send + Sync {
    fn find_by_id(&self, owner: &OwnerId) -> Result<Option<UserProfile>>;
}

/// Range-filter and group records by local calendar day.
///
/// Shared by the store backends that hold records in process memory.
pub(crate) fn group_by_day<'a, I>(
    records: I,
    owner: &OwnerId,
    start: DateTime<Local>,
    end: DateTime<Local>,
) -> Vec<DayTotals>
where
    I: IntoIterator<Item = &'a ConsumptionRecord>,
{
    let start = start.with_timezone(&Utc);
    let end = end.with_timezone(&Utc);

    let mut groups: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for record in records {
        if &record.owner_id != owner || record.occurred_at < start || record.occurred_at > end {
            continue;
        }
        let date = record.local_date();
        groups
            .entry(date)
            .or_insert_with(|| DayTotals::empty(date))
            .add(record);
    }

    groups.into_values().collect()
}
