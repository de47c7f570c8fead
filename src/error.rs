//! Crate-level error type.

use crate::config::SetupError;
use crate::web_service::ServiceError;

/// Any failure raised while building a [`Searcher`](crate::Searcher) or running a search
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid setup parameter
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// Transport or service failure
    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub type Result<T> = std::result::Result<T, Error>;
