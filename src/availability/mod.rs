//! Hotel availability search.

pub mod engine;
pub mod types;

pub use engine::AvailabilityService;
pub use types::{HotelSummary, SearchCriteria, SearchQuery, SearchResults};
