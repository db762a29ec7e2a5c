//! Service ports: traits + data contracts.

pub mod search;
pub mod settings;

pub use search::{RawHit, Result as SearchResult, SearchError, SearchSink, SearchStatus};
pub use settings::{QueryDefaults, SearchSettings};
