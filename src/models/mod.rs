//! Core data models for search criteria and extracted PNX records.

mod holding;
mod search;

pub use holding::{Holding, RelatedLink, Resource, TableOfContents};
pub use search::{SearchCriteria, SearchField, SearchMode, SearchParams, DEFAULT_GENRE};
