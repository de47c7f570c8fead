//! Primo X-Services over HTTP.

use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

use super::{check_envelope, EshelfRequest, ServiceError, WebService};
use crate::models::{SearchField, SearchParams};
use crate::pnx::{PnxDocument, PNX_NS};
use crate::utils::HttpClient;

const FULL_RECORD_PATH: &str = "/PrimoWebServices/xservice/search/full";
const BRIEF_SEARCH_PATH: &str = "/PrimoWebServices/xservice/search/brief";
const ESHELF_PATH: &str = "/PrimoWebServices/services/primo/eshelf";

/// Number of documents requested from a brief search
pub const DEFAULT_BULK_SIZE: usize = 10;

/// Live Primo web service
#[derive(Debug, Clone)]
pub struct HttpWebService {
    client: Arc<HttpClient>,
    base_url: String,
    bulk_size: usize,
}

impl HttpWebService {
    /// Create a web service for the Primo installation at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        Ok(Self::with_client(base_url, Arc::new(HttpClient::new()?)))
    }

    /// Create with a custom HTTP client
    pub fn with_client(base_url: impl Into<String>, client: Arc<HttpClient>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            bulk_size: DEFAULT_BULK_SIZE,
        }
    }

    /// Set how many documents a brief search asks for
    pub fn bulk_size(mut self, bulk_size: usize) -> Self {
        self.bulk_size = bulk_size;
        self
    }

    fn record_url(&self, doc_id: &str, institution: &str) -> Result<Url, ServiceError> {
        let url = Url::parse_with_params(
            &format!("{}{}", self.base_url, FULL_RECORD_PATH),
            &[("institution", institution), ("docId", doc_id)],
        )?;
        Ok(url)
    }

    fn brief_url(&self, params: &SearchParams, institution: &str) -> Result<Url, ServiceError> {
        let mut pairs = vec![
            ("institution".to_string(), institution.to_string()),
            ("indx".to_string(), "1".to_string()),
            ("bulkSize".to_string(), self.bulk_size.to_string()),
        ];
        for (field, value) in params.iter() {
            pairs.push(("query".to_string(), query_term(field, value)));
        }

        let url = Url::parse_with_params(&format!("{}{}", self.base_url, BRIEF_SEARCH_PATH), &pairs)?;
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<PnxDocument, ServiceError> {
        tracing::debug!(%url, "Requesting Primo");

        let response = self
            .client
            .client()
            .get(url)
            .send()
            .await
            .map_err(|e| ServiceError::Network(format!("Failed to reach Primo: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::Api(format!(
                "Primo returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::Network(format!("Failed to read response: {}", e)))?;

        let doc = PnxDocument::parse(&body)?;
        check_envelope(&doc)?;
        Ok(doc)
    }

    /// POST an e-shelf request and return the raw response body
    pub async fn send_eshelf(&self, request: &EshelfRequest) -> Result<String, ServiceError> {
        let url = Url::parse(&format!("{}{}", self.base_url, ESHELF_PATH))?;
        let body = request.to_xml()?;
        tracing::debug!(%url, operation = request.operation(), "Sending e-shelf request");

        let response = self
            .client
            .client()
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Api(format!(
                "Primo returned status: {}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl WebService for HttpWebService {
    async fn get_record(
        &self,
        doc_id: &str,
        institution: &str,
    ) -> Result<PnxDocument, ServiceError> {
        let doc = self.fetch(self.record_url(doc_id, institution)?).await?;
        if doc.find(PNX_NS, "record").is_none() {
            return Err(ServiceError::NotFound(doc_id.to_string()));
        }
        Ok(doc)
    }

    async fn search_brief(
        &self,
        params: &SearchParams,
        institution: &str,
    ) -> Result<PnxDocument, ServiceError> {
        self.fetch(self.brief_url(params, institution)?).await
    }
}

/// X-Services `query` value: `<index>,<precision>,<value>`
fn query_term(field: SearchField, value: &str) -> String {
    let (index, precision) = match field {
        SearchField::Isbn => ("isbn", "exact"),
        SearchField::Issn => ("issn", "exact"),
        SearchField::Title => ("title", "contains"),
        SearchField::Author => ("creator", "contains"),
        SearchField::Genre => ("facet_rtype", "exact"),
    };
    format!("{},{},{}", index, precision, value)
}
