//! Utilities shared by the web-service implementations.
//!
//! - [`HttpClient`]: reqwest client with the crate user agent and timeouts

mod http;

pub use http::{HttpClient, DEFAULT_TIMEOUT};
