//! Type definitions for hydrotrack

mod consumption;
mod error;
mod report;

pub use consumption::*;
pub use error::*;
pub use report::*;
