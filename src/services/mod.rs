//! Rollup engine: window calculation, bucket generation, aggregation

pub mod aggregator;
pub mod buckets;
pub mod rollup;
pub mod window;

pub use aggregator::Aggregator;
pub use buckets::generate_buckets;
pub use rollup::RollupService;
pub use window::{
    end_of_day, end_of_day_in, local_midnight, local_midnight_in, window_bounds_in, window_for,
};
