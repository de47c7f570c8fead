//! The boundary to the Primo web services.
//!
//! The [`WebService`] trait covers the two calls a search needs: a full-record
//! lookup by document id and a brief search by metadata. Both return the parsed
//! response. [`HttpWebService`] talks to a live Primo installation over the
//! X-Services REST API; [`MockWebService`] serves canned responses.
//!
//! The e-shelf family of requests is covered by the builders in [`eshelf`];
//! their responses are not interpreted.

pub mod eshelf;
mod http;
pub mod mock;

pub use eshelf::EshelfRequest;
pub use http::HttpWebService;
pub use mock::MockWebService;

use async_trait::async_trait;

use crate::models::SearchParams;
use crate::pnx::{PnxDocument, SEARCH_NS};

/// A Primo web-service endpoint
#[async_trait]
pub trait WebService: Send + Sync + std::fmt::Debug {
    /// Fetch a single record by Primo document id
    async fn get_record(&self, doc_id: &str, institution: &str)
        -> Result<PnxDocument, ServiceError>;

    /// Run a brief search
    async fn search_brief(
        &self,
        params: &SearchParams,
        institution: &str,
    ) -> Result<PnxDocument, ServiceError>;
}

/// Reject a response whose envelope carries a Primo `ERROR` element
pub fn check_envelope(doc: &PnxDocument) -> Result<(), ServiceError> {
    match doc.find(SEARCH_NS, "ERROR") {
        Some(error) => {
            let message = error
                .attribute("MESSAGE")
                .map(str::to_string)
                .unwrap_or_else(|| error.text());
            Err(ServiceError::Api(message))
        }
        None => Ok(()),
    }
}

/// Errors raised by a web-service call
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Error reported by Primo
    #[error("API error: {0}")]
    Api(String),

    /// No record for the requested document id
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Malformed response
    #[error("Parse error: {0}")]
    Parse(String),

    /// A request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Network(err.to_string())
    }
}

impl From<url::ParseError> for ServiceError {
    fn from(err: url::ParseError) -> Self {
        ServiceError::InvalidRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_envelope_error() {
        let doc = PnxDocument::parse(
            r#"<SEGMENTS xmlns="http://www.exlibrisgroup.com/xsd/jaguar/search">
                <JAGROOT><RESULT><ERROR CODE="-6" MESSAGE="Record not found"/></RESULT></JAGROOT>
            </SEGMENTS>"#,
        )
        .unwrap();
        match check_envelope(&doc) {
            Err(ServiceError::Api(message)) => assert_eq!(message, "Record not found"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_check_envelope_ok() {
        let doc = PnxDocument::parse(
            r#"<SEGMENTS xmlns="http://www.exlibrisgroup.com/xsd/jaguar/search">
                <JAGROOT><RESULT><DOCSET TOTALHITS="0"/></RESULT></JAGROOT>
            </SEGMENTS>"#,
        )
        .unwrap();
        assert!(check_envelope(&doc).is_ok());
    }
}
