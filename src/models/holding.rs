//! Records extracted from a PNX document: holdings, full-text resources,
//! tables of contents and related links.
//!
//! Each record refers back to its document through `record_id`. Records are
//! built once per matching element and never modified afterwards.

use serde::{Deserialize, Serialize};
use url::Url;

/// Path of the Primo full-record display page, relative to the base URL
const DISPLAY_PATH: &str = "/primo_library/libweb/action/dlDisplay.do";

/// A physical or electronic location where a document can be found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// PNX record id of the owning document
    pub record_id: String,

    pub title: String,

    pub author: String,

    /// `display/type` of the owning document (e.g. `book`, `journal`)
    pub display_type: String,

    /// Origin token of the merged source record this holding came from
    pub origin: Option<String>,

    /// Raw encoded `availlibrary` value
    pub availlibrary: Option<String>,

    pub institution_code: Option<String>,

    pub library_code: Option<String>,

    /// Display name of the library, or the library code when unmapped
    pub library: Option<String>,

    /// Collection / shelf area
    pub id_one: Option<String>,

    /// Call number
    pub id_two: Option<String>,

    /// Always `check_holdings`
    pub status_code: String,

    /// Display name of the status, or the status code when unmapped
    pub status: String,

    pub source_id: String,

    pub source_record_id: String,

    pub original_source_id: String,

    pub coverage: Vec<String>,

    pub notes: String,

    /// Primo display page for the owning document
    pub url: String,

    pub request_url: Option<String>,
}

impl Holding {
    /// Display page URL for a record, with each query value percent-encoded
    pub fn display_url(base_url: &str, institution: &str, vid: &str, record_id: &str) -> String {
        let page = format!("{}{}", base_url.trim_end_matches('/'), DISPLAY_PATH);
        match Url::parse_with_params(
            &page,
            &[("docId", record_id), ("institution", institution), ("vid", vid)],
        ) {
            Ok(url) => url.into(),
            Err(e) => {
                tracing::warn!(base_url, error = %e, "Cannot build display URL");
                String::new()
            }
        }
    }

    pub fn institution(&self) -> Option<&str> {
        self.institution_code.as_deref()
    }

    pub fn collection(&self) -> Option<&str> {
        self.id_one.as_deref()
    }

    pub fn call_number(&self) -> Option<&str> {
        self.id_two.as_deref()
    }
}

/// A full-text link (`links/linktorsrc`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub record_id: String,

    /// Raw encoded `linktorsrc` value
    pub linktorsrc: Option<String>,

    /// `$$V` sub-field; carried through but otherwise unused
    pub v: Option<String>,

    pub url: String,

    pub display: Option<String>,

    pub institution_code: Option<String>,

    pub origin: Option<String>,

    pub notes: String,
}

/// A table of contents link (`links/linktotoc`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOfContents {
    pub record_id: String,

    /// Raw encoded `linktotoc` value
    pub linktotoc: Option<String>,

    pub url: String,

    pub display: Option<String>,

    pub notes: String,
}

/// A related link (`links/addlink`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLink {
    pub record_id: String,

    /// Raw encoded `addlink` value
    pub addlink: Option<String>,

    pub url: String,

    pub display: Option<String>,

    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_url() {
        assert_eq!(
            Holding::display_url("http://bobcat.library.nyu.edu/", "NYU", "NYU", "nyu_aleph000062856"),
            "http://bobcat.library.nyu.edu/primo_library/libweb/action/dlDisplay.do?docId=nyu_aleph000062856&institution=NYU&vid=NYU"
        );
    }

    #[test]
    fn test_display_url_encodes_reserved_characters() {
        let url = Holding::display_url("http://bobcat.library.nyu.edu", "NYU", "NYU", "TN_a&b c#d");
        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.fragment(), None);

        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("docId".to_string(), "TN_a&b c#d".to_string()),
                ("institution".to_string(), "NYU".to_string()),
                ("vid".to_string(), "NYU".to_string()),
            ]
        );
    }

    #[test]
    fn test_display_url_with_unusable_base() {
        assert_eq!(Holding::display_url("not a url", "NYU", "NYU", "doc1"), "");
    }
}
