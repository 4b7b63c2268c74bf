//! JSON file store for records and profiles
//!
//! Keeps `records.json` and `profiles.json` under the configured data
//! directory. Reads take a shared lock on `store.lock`; every
//! read-modify-write holds the exclusive lock and replaces the data file
//! atomically (temp file + rename).

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{group_by_day, ObjectIdGenerator, ProfileStore, RecordStore};
use crate::config::Config;
use crate::types::{
    ConsumptionRecord, DayTotals, HydroError, NewRecord, OwnerId, RecordId, Result, UserProfile,
};

const RECORDS_FILE: &str = "records.json";
const PROFILES_FILE: &str = "profiles.json";
const LOCK_FILE: &str = "store.lock";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RecordFile {
    pub updated_at: i64,
    pub records: Vec<ConsumptionRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProfileFile {
    pub updated_at: i64,
    pub profiles: Vec<UserProfile>,
}

impl RecordFile {
    /// Time of the last write, None for a store that was never written
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        stamp_to_datetime(self.updated_at)
    }
}

impl ProfileFile {
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        stamp_to_datetime(self.updated_at)
    }
}

fn stamp_to_datetime(secs: i64) -> Option<DateTime<Utc>> {
    (secs > 0).then(|| DateTime::from_timestamp(secs, 0)).flatten()
}

pub struct JsonFileStore {
    data_dir: PathBuf,
    ids: ObjectIdGenerator,
}

fn unavailable(context: &str, err: impl std::fmt::Display) -> HydroError {
    HydroError::StoreUnavailable(format!("{}: {}", context, err))
}

impl JsonFileStore {
    /// Open (creating if needed) the store in `config.data_dir`
    pub fn open(config: &Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)
            .map_err(|e| unavailable("Failed to create data directory", e))?;
        Ok(Self::with_data_dir(config.data_dir.clone()))
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ids: ObjectIdGenerator::new(),
        }
    }

    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(RECORDS_FILE)
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.data_dir.join(PROFILES_FILE)
    }

    /// Insert or replace a profile
    pub fn save_profile(&self, profile: UserProfile) -> Result<()> {
        let path = self.profiles_path();
        self.with_exclusive(|| {
            let mut file: ProfileFile = read_json(&path)?;
            match file.profiles.iter_mut().find(|p| p.id == profile.id) {
                Some(existing) => *existing = profile,
                None => file.profiles.push(profile),
            }
            file.updated_at = Utc::now().timestamp();
            write_json_atomic(&path, &file)
        })
    }

    fn lock_file(&self) -> Result<File> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| unavailable("Failed to create data directory", e))?;
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.data_dir.join(LOCK_FILE))
            .map_err(|e| unavailable("Failed to open lock file", e))
    }

    fn with_shared<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self.lock_file()?;
        lock.lock_shared()
            .map_err(|e| unavailable("Failed to acquire read lock", e))?;
        let result = f();
        let _ = lock.unlock();
        result
    }

    fn with_exclusive<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self.lock_file()?;
        lock.lock_exclusive()
            .map_err(|e| unavailable("Failed to acquire write lock", e))?;
        let result = f();
        let _ = lock.unlock();
        result
    }

    fn load_records(&self) -> Result<Vec<ConsumptionRecord>> {
        let path = self.records_path();
        let file: RecordFile = self.with_shared(|| read_json(&path))?;
        debug!(
            store = "json-file",
            records = file.records.len(),
            updated_at = ?file.last_updated(),
            "loaded records"
        );
        Ok(file.records)
    }
}

/// Read a data file. A missing or empty file reads as the default value.
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }

    let mut content = String::new();
    File::open(path)
        .and_then(|f| std::io::BufReader::new(f).read_to_string(&mut content))
        .map_err(|e| unavailable("Failed to read store file", e))?;

    if content.trim().is_empty() {
        warn!(path = %path.display(), "store file is empty, treating as no data");
        return Ok(T::default());
    }

    serde_json::from_str(&content).map_err(|e| unavailable("Corrupted store file", e))
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| unavailable("Serialization failed", e))?;
    let temp_path = path.with_extension("json.tmp");

    {
        let mut file = File::create(&temp_path)
            .map_err(|e| unavailable("Failed to create temp file", e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| unavailable("Failed to write temp file", e))?;
        file.sync_all()
            .map_err(|e| unavailable("Failed to sync temp file", e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| unavailable("Failed to rename temp file", e))
}

impl RecordStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    fn insert(&self, record: NewRecord) -> Result<RecordId> {
        let path = self.records_path();
        self.with_exclusive(|| {
            let mut file: RecordFile = read_json(&path)?;
            let now = Utc::now();

            let mut id = self.ids.next_id(now);
            while file.records.iter().any(|r| r.id == id) {
                id = self.ids.next_id(now);
            }

            let record = record.into_record(id.clone(), now)?;
            debug!(store = "json-file", %id, owner = %record.owner_id, "insert");
            file.records.push(record);
            file.updated_at = now.timestamp();
            write_json_atomic(&path, &file)?;
            Ok(id)
        })
    }

    fn find_by_id(&self, id: &RecordId) -> Result<Option<ConsumptionRecord>> {
        Ok(self.load_records()?.into_iter().find(|r| &r.id == id))
    }

    fn delete_by_id(&self, id: &RecordId) -> Result<bool> {
        let path = self.records_path();
        self.with_exclusive(|| {
            let mut file: RecordFile = read_json(&path)?;
            let before = file.records.len();
            file.records.retain(|r| &r.id != id);
            if file.records.len() == before {
                return Ok(false);
            }
            file.updated_at = Utc::now().timestamp();
            write_json_atomic(&path, &file)?;
            debug!(store = "json-file", %id, "delete");
            Ok(true)
        })
    }

    fn find_all(&self) -> Result<Vec<ConsumptionRecord>> {
        let mut all = self.load_records()?;
        all.sort_by(|a, b| (a.occurred_at, &a.id).cmp(&(b.occurred_at, &b.id)));
        Ok(all)
    }

    fn range_group_by_day(
        &self,
        owner: &OwnerId,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Vec<DayTotals>> {
        let records = self.load_records()?;
        let groups = group_by_day(&records, owner, start, end);
        debug!(store = "json-file", %owner, days = groups.len(), "range_group_by_day");
        Ok(groups)
    }
}

impl ProfileStore for JsonFileStore {
    fn find_by_id(&self, owner: &OwnerId) -> Result<Option<UserProfile>> {
        let path = self.profiles_path();
        let file: ProfileFile = self.with_shared(|| read_json(&path))?;
        debug!(
            store = "json-file",
            %owner,
            updated_at = ?file.last_updated(),
            "loaded profiles"
        );
        Ok(file.profiles.into_iter().find(|p| &p.id == owner))
    }
}
