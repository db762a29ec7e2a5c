//! Headless search core: services plus result aggregation.

pub mod results;
pub mod services;

pub use results::{FileMatches, LineMatch, ResultAggregator};
