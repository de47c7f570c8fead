//! Searching Primo and collecting the extracted records.

use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

use crate::config::Setup;
use crate::error::Result;
use crate::models::{Holding, RelatedLink, Resource, SearchCriteria, SearchMode, TableOfContents};
use crate::pnx::{extract, PnxDocument, RecordData, RecordLinks};
use crate::web_service::{HttpWebService, ServiceError, WebService};

/// Outcome of one search
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResult {
    /// `TOTALHITS` of the response; unset when no search ran
    pub count: Option<u64>,

    /// Bibliographic fields of a requested document, by `addata` tag name
    pub fields: IndexMap<String, String>,

    pub cover_image: Option<String>,
    pub titles: Vec<String>,
    pub authors: Vec<String>,

    pub holdings: Vec<Holding>,
    pub resources: Vec<Resource>,
    pub tables_of_contents: Vec<TableOfContents>,
    pub related_links: Vec<RelatedLink>,

    /// Parsed response, kept for callers needing elements not extracted above
    #[serde(skip)]
    pub response: Option<PnxDocument>,
}

impl SearchResult {
    /// A bibliographic field by name, e.g. `isbn`, `btitle` or `pub`
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether a request was made. False when the criteria were insufficient.
    pub fn searched(&self) -> bool {
        self.response.is_some()
    }

    fn with_record(mut self, record: RecordData) -> Self {
        self.fields = record.fields;
        self.cover_image = record.cover_image;
        self.titles = record.titles;
        self.authors = record.authors;
        self
    }

    fn with_links(mut self, links: RecordLinks) -> Self {
        self.holdings = links.holdings;
        self.resources = links.resources;
        self.tables_of_contents = links.tables_of_contents;
        self.related_links = links.related_links;
        self
    }
}

/// Runs searches against one Primo installation.
///
/// ```no_run
/// use primo::{SearchCriteria, Searcher, Setup};
///
/// # async fn run() -> primo::Result<()> {
/// let setup = Setup::builder()
///     .base_url("http://bobcat.library.nyu.edu")
///     .institution("NYU")
///     .build()?;
/// let searcher = Searcher::new(setup)?;
/// let result = searcher
///     .search(&SearchCriteria::new().isbn("0143039008"))
///     .await?;
/// for holding in &result.holdings {
///     println!("{:?} {:?}", holding.library, holding.call_number());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Searcher {
    setup: Setup,
    service: Arc<dyn WebService>,
}

impl Searcher {
    /// Create a searcher backed by the Primo X-Services at `setup.base_url`
    pub fn new(setup: Setup) -> Result<Self> {
        let service = HttpWebService::new(setup.base_url.clone())?;
        Ok(Self::with_service(setup, Arc::new(service)))
    }

    /// Create a searcher backed by any web service
    pub fn with_service(setup: Setup, service: Arc<dyn WebService>) -> Self {
        Self { setup, service }
    }

    pub fn setup(&self) -> &Setup {
        &self.setup
    }

    /// Search Primo.
    ///
    /// Insufficient criteria are not an error: no request is made and an
    /// empty result is returned. Transport and service failures are returned
    /// unchanged.
    pub async fn search(&self, criteria: &SearchCriteria) -> std::result::Result<SearchResult, ServiceError> {
        let Some(mode) = criteria.mode() else {
            tracing::debug!("Insufficient search criteria, skipping search");
            return Ok(SearchResult::default());
        };
        tracing::debug!(?mode, institution = %self.setup.institution, "Searching Primo");

        let institution = &self.setup.institution;
        let (response, record) = match (mode, criteria.doc_id_value()) {
            (SearchMode::DocumentId, Some(doc_id)) => {
                let response = self.service.get_record(doc_id, institution).await?;
                let record = RecordData::extract(&response);
                (response, Some(record))
            }
            _ => {
                let params = criteria.search_params();
                let response = self.service.search_brief(&params, institution).await?;
                (response, None)
            }
        };

        let links = RecordLinks::extract(&response, criteria, &self.setup);
        let mut result = SearchResult {
            count: extract::total_hits(&response),
            ..SearchResult::default()
        };
        if let Some(record) = record {
            result = result.with_record(record);
        }
        result = result.with_links(links);
        result.response = Some(response);
        Ok(result)
    }
}
