//! Mock web service for testing purposes.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use super::{check_envelope, ServiceError, WebService};
use crate::models::SearchParams;
use crate::pnx::PnxDocument;

/// Response body returned by a brief search when nothing is configured
const EMPTY_BRIEF_RESPONSE: &str = r#"<SEGMENTS xmlns="http://www.exlibrisgroup.com/xsd/jaguar/search"><JAGROOT><RESULT><DOCSET TOTALHITS="0"/></RESULT></JAGROOT></SEGMENTS>"#;

/// A call received by [`MockWebService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    GetRecord { doc_id: String, institution: String },
    SearchBrief { params: SearchParams, institution: String },
}

/// A web service that serves predefined XML bodies and records its calls.
#[derive(Debug, Default)]
pub struct MockWebService {
    record_response: Mutex<Option<String>>,
    brief_response: Mutex<Option<String>>,
    failure: Mutex<Option<String>>,
    calls: Mutex<Vec<MockCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockWebService {
    /// Create a new mock web service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the body returned by `get_record`.
    pub fn set_record_response(&self, xml: impl Into<String>) {
        *lock(&self.record_response) = Some(xml.into());
    }

    /// Set the body returned by `search_brief`.
    pub fn set_brief_response(&self, xml: impl Into<String>) {
        *lock(&self.brief_response) = Some(xml.into());
    }

    /// Make every call fail with an API error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *lock(&self.failure) = Some(message.into());
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    fn check_failure(&self) -> Result<(), ServiceError> {
        match lock(&self.failure).as_ref() {
            Some(message) => Err(ServiceError::Api(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WebService for MockWebService {
    async fn get_record(
        &self,
        doc_id: &str,
        institution: &str,
    ) -> Result<PnxDocument, ServiceError> {
        lock(&self.calls).push(MockCall::GetRecord {
            doc_id: doc_id.to_string(),
            institution: institution.to_string(),
        });
        self.check_failure()?;

        let body = lock(&self.record_response).clone();
        match body {
            Some(xml) => {
                let doc = PnxDocument::parse(&xml)?;
                check_envelope(&doc)?;
                Ok(doc)
            }
            None => Err(ServiceError::NotFound(doc_id.to_string())),
        }
    }

    async fn search_brief(
        &self,
        params: &SearchParams,
        institution: &str,
    ) -> Result<PnxDocument, ServiceError> {
        lock(&self.calls).push(MockCall::SearchBrief {
            params: params.clone(),
            institution: institution.to_string(),
        });
        self.check_failure()?;

        let body = lock(&self.brief_response)
            .clone()
            .unwrap_or_else(|| EMPTY_BRIEF_RESPONSE.to_string());
        let doc = PnxDocument::parse(&body)?;
        check_envelope(&doc)?;
        Ok(doc)
    }
}
