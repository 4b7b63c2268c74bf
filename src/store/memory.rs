//! In-process store backed by an owner/time index

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Local, Utc};
use parking_lot::RwLock;
use tracing::debug;

use super::{group_by_day, ObjectIdGenerator, ProfileStore, RecordStore};
use crate::types::{
    ConsumptionRecord, DayTotals, NewRecord, ObjectId, OwnerId, RecordId, Result, UserProfile,
};

#[derive(Default)]
struct Inner {
    records: HashMap<RecordId, ConsumptionRecord>,
    /// Per-owner index ordered by (occurred_at, id) for range scans
    by_owner: HashMap<OwnerId, BTreeSet<(DateTime<Utc>, RecordId)>>,
}

/// Thread-safe in-memory record and profile store
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    profiles: RwLock<HashMap<OwnerId, UserProfile>>,
    ids: ObjectIdGenerator,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile
    pub fn save_profile(&self, profile: UserProfile) {
        self.profiles.write().insert(profile.id.clone(), profile);
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Next generated id not already taken; the counter may wrap within a second
    fn fresh_id(
        &self,
        records: &HashMap<RecordId, ConsumptionRecord>,
        now: DateTime<Utc>,
    ) -> RecordId {
        let mut id = self.ids.next_id(now);
        while records.contains_key(&id) {
            id = self.ids.next_id(now);
        }
        id
    }
}

impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn insert(&self, record: NewRecord) -> Result<RecordId> {
        let now = Utc::now();
        let mut inner = self.inner.write();
        let id = self.fresh_id(&inner.records, now);
        let record = record.into_record(id.clone(), now)?;

        inner
            .by_owner
            .entry(record.owner_id.clone())
            .or_default()
            .insert((record.occurred_at, id.clone()));
        inner.records.insert(id.clone(), record);
        Ok(id)
    }

    fn find_by_id(&self, id: &RecordId) -> Result<Option<ConsumptionRecord>> {
        Ok(self.inner.read().records.get(id).cloned())
    }

    fn delete_by_id(&self, id: &RecordId) -> Result<bool> {
        let mut inner = self.inner.write();
        let Some(record) = inner.records.remove(id) else {
            return Ok(false);
        };
        if let Some(index) = inner.by_owner.get_mut(&record.owner_id) {
            index.remove(&(record.occurred_at, record.id.clone()));
            if index.is_empty() {
                inner.by_owner.remove(&record.owner_id);
            }
        }
        Ok(true)
    }

    fn find_all(&self) -> Result<Vec<ConsumptionRecord>> {
        let mut all: Vec<ConsumptionRecord> = self.inner.read().records.values().cloned().collect();
        all.sort_by(|a, b| (a.occurred_at, &a.id).cmp(&(b.occurred_at, &b.id)));
        Ok(all)
    }

    fn range_group_by_day(
        &self,
        owner: &OwnerId,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Vec<DayTotals>> {
        let inner = self.inner.read();
        let Some(index) = inner.by_owner.get(owner) else {
            return Ok(Vec::new());
        };

        let lo = (start.with_timezone(&Utc), ObjectId::from_bytes([0x00; 12]));
        let hi = (end.with_timezone(&Utc), ObjectId::from_bytes([0xFF; 12]));
        if lo > hi {
            return Ok(Vec::new());
        }

        let in_range = index
            .range(lo..=hi)
            .filter_map(|(_, id)| inner.records.get(id));
        let groups = group_by_day(in_range, owner, start, end);

        debug!(store = "memory", %owner, days = groups.len(), "range_group_by_day");
        Ok(groups)
    }
}

impl ProfileStore for MemoryStore {
    fn find_by_id(&self, owner: &OwnerId) -> Result<Option<UserProfile>> {
        Ok(self.profiles.read().get(owner).cloned())
    }
}
