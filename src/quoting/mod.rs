//! Hotel rate quoting.

pub mod engine;
pub mod types;

pub use engine::QuoteService;
pub use types::{QuoteCriteria, QuoteRequestBody, QuoteResults, RateQuote};
