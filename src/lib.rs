//! # Primo
//!
//! A client for the Ex Libris Primo discovery service. Given a Primo document
//! id, or enough bibliographic metadata to search by (an ISBN or ISSN, or a
//! title, author and genre), it calls the Primo X-Services and maps the PNX
//! response into holdings, full-text resources, tables of contents and related
//! links.
//!
//! ## Architecture
//!
//! - [`models`]: search criteria and the extracted records
//! - [`pnx`]: the response tree, the `$$`-delimited sub-field codec and the
//!   extractors
//! - [`web_service`]: the web-service boundary, over HTTP or mocked
//! - [`config`]: setup loading and validation
//! - [`searcher`]: ties the pieces together
//! - [`utils`]: the shared HTTP client

pub mod config;
pub mod error;
pub mod models;
pub mod pnx;
pub mod searcher;
pub mod utils;
pub mod web_service;

// Re-export commonly used types
pub use config::{load_setup, setup_from_env, PrimoConfig, Setup, SetupError};
pub use error::{Error, Result};
pub use models::{Holding, RelatedLink, Resource, SearchCriteria, TableOfContents};
pub use searcher::{SearchResult, Searcher};
pub use web_service::{HttpWebService, MockWebService, ServiceError, WebService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
