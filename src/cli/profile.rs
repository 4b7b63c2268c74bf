//! `hydrotrack profile` subcommands

use clap::Subcommand;

use crate::store::{JsonFileStore, ProfileStore};
use crate::types::{HydroError, ObjectId, Result, UserProfile};

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Create or replace an owner profile
    Set {
        /// Owner id (24 hex characters)
        #[arg(long, value_name = "OWNER_ID")]
        id: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        /// Daily consumption goal
        #[arg(long)]
        goal: f64,
    },

    /// Print an owner profile
    Show {
        #[arg(value_name = "OWNER_ID")]
        id: String,
    },
}

impl ProfileCommand {
    pub fn run(self, store: &JsonFileStore) -> Result<()> {
        let profile = match self {
            Self::Set {
                id,
                username,
                email,
                goal,
            } => {
                let profile = build_profile(&id, username, email, goal)?;
                store.save_profile(profile.clone())?;
                profile
            }
            Self::Show { id } => {
                let owner = ObjectId::parse_owner(&id)?;
                store
                    .find_by_id(&owner)?
                    .ok_or_else(|| HydroError::OwnerNotFound(owner.to_string()))?
            }
        };

        let json = serde_json::to_string_pretty(&profile)?;
        println!("{}", json);
        Ok(())
    }
}

fn build_profile(id: &str, username: String, email: String, goal: f64) -> Result<UserProfile> {
    let id = ObjectId::parse_owner(id)?;
    if username.trim().is_empty() {
        return Err(HydroError::Parse("username must not be empty".into()));
    }
    if !goal.is_finite() || goal < 0.0 {
        return Err(HydroError::Parse(format!(
            "goal must be a non-negative number, got {}",
            goal
        )));
    }
    Ok(UserProfile {
        id,
        username,
        email,
        goal,
    })
}
