//! hydrotrack: per-user liquid-consumption tracking with gap-filled
//! daily, weekly and monthly rollups against a consumption goal.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hydrotrack::config::Config;
//! use hydrotrack::services::RollupService;
//! use hydrotrack::store::JsonFileStore;
//!
//! let config = Config::load(None)?;
//! let store = Arc::new(JsonFileStore::open(&config)?);
//! let rollup = RollupService::new(store.clone(), store, config);
//! let report = rollup.weekly_report("64b7f0c2a1e4d3b2c1a09f8e")?;
//! assert_eq!(report.buckets.len(), 7);
//! # Ok::<(), hydrotrack::types::HydroError>(())
//! ```

pub mod cli;
pub mod config;
pub mod services;
pub mod store;
pub mod types;
