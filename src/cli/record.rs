//! `hydrotrack record` subcommands

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::store::{ProfileStore, RecordStore};
use crate::types::{
    ConsumptionRecord, HydroError, NewRecord, ObjectId, OwnerId, RecordId, Result, UserProfile,
};

#[derive(Subcommand, Debug)]
pub enum RecordCommand {
    /// Store a consumption record
    Add(AddArgs),

    /// Print one record
    Show {
        #[arg(value_name = "RECORD_ID")]
        id: String,
    },

    /// Delete one record
    Delete {
        #[arg(value_name = "RECORD_ID")]
        id: String,
    },

    /// List records (oldest first) with their owner's username and email
    List {
        /// Only records of this owner
        #[arg(long, value_name = "OWNER_ID")]
        owner: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Owner id (24 hex characters)
    #[arg(long, value_name = "OWNER_ID")]
    pub owner: String,

    /// Volume consumed
    #[arg(long)]
    pub volume: f64,

    /// Number of cups
    #[arg(long)]
    pub cups: u64,

    /// When it was consumed (RFC 3339); defaults to now
    #[arg(long, value_name = "TIMESTAMP")]
    pub at: Option<String>,
}

impl AddArgs {
    fn into_new_record(self) -> Result<NewRecord> {
        let occurred_at = self.at.as_deref().map(parse_timestamp).transpose()?;
        Ok(NewRecord {
            owner_id: self.owner,
            volume: self.volume,
            cup_count: self.cups,
            occurred_at,
        })
    }
}

/// Owner fields shown next to each listed record
#[derive(Debug, Serialize, PartialEq)]
pub struct OwnerSummary {
    pub username: String,
    pub email: String,
}

impl From<&UserProfile> for OwnerSummary {
    fn from(profile: &UserProfile) -> Self {
        Self {
            username: profile.username.clone(),
            email: profile.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordListing {
    #[serde(flatten)]
    pub record: ConsumptionRecord,
    pub owner: Option<OwnerSummary>,
}

impl RecordCommand {
    pub fn run<S: RecordStore + ProfileStore>(self, store: &S) -> Result<()> {
        match self {
            Self::Add(args) => {
                let id = store.insert(args.into_new_record()?)?;
                let record = find_record(store, &id)?;
                print_json(&record)
            }
            Self::Show { id } => {
                let id = parse_record_id(&id)?;
                print_json(&show_record(store, &id)?)
            }
            Self::Delete { id } => {
                let record_id = parse_record_id(&id)?;
                if store.delete_by_id(&record_id)? {
                    println!("Deleted record {}", record_id);
                    Ok(())
                } else {
                    Err(HydroError::RecordNotFound(id))
                }
            }
            Self::List { owner } => {
                let owner = owner.as_deref().map(ObjectId::parse_owner).transpose()?;
                print_json(&list_records(store, owner.as_ref())?)
            }
        }
    }
}

/// All records (optionally one owner's) joined with owner profiles
pub fn list_records<S: RecordStore + ProfileStore>(
    store: &S,
    owner: Option<&OwnerId>,
) -> Result<Vec<RecordListing>> {
    let records: Vec<ConsumptionRecord> = RecordStore::find_all(store)?
        .into_iter()
        .filter(|r| owner.is_none_or(|o| &r.owner_id == o))
        .collect();

    let mut profiles: HashMap<OwnerId, Option<UserProfile>> = HashMap::new();
    for record in &records {
        if !profiles.contains_key(&record.owner_id) {
            let profile = ProfileStore::find_by_id(store, &record.owner_id)?;
            profiles.insert(record.owner_id.clone(), profile);
        }
    }

    Ok(records
        .into_iter()
        .map(|record| {
            let owner = profiles
                .get(&record.owner_id)
                .and_then(|p| p.as_ref())
                .map(OwnerSummary::from);
            RecordListing { record, owner }
        })
        .collect())
}

/// One record joined with its owner's profile
pub fn show_record<S: RecordStore + ProfileStore>(
    store: &S,
    id: &RecordId,
) -> Result<RecordListing> {
    let record = find_record(store, id)?;
    let owner = ProfileStore::find_by_id(store, &record.owner_id)?;
    Ok(RecordListing {
        owner: owner.as_ref().map(OwnerSummary::from),
        record,
    })
}

fn find_record<S: RecordStore>(store: &S, id: &RecordId) -> Result<ConsumptionRecord> {
    RecordStore::find_by_id(store, id)?.ok_or_else(|| HydroError::RecordNotFound(id.to_string()))
}

fn parse_record_id(raw: &str) -> Result<RecordId> {
    ObjectId::parse(raw).ok_or_else(|| HydroError::RecordNotFound(raw.to_string()))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| HydroError::Parse(format!("invalid timestamp {:?}: {}", raw, e)))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
