//! Search criteria and brief-search parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Genre every PNX record is assumed to have when `addata/genre` is absent
pub const DEFAULT_GENRE: &str = "article";

/// Identifying metadata supplied by the caller
///
/// Blank strings are treated the same as absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Primo document id (e.g. `nyu_aleph000062856`)
    pub doc_id: Option<String>,

    pub isbn: Option<String>,

    pub issn: Option<String>,

    pub title: Option<String>,

    pub author: Option<String>,

    /// Genre filter applied to brief-search results (e.g. `book`, `journal`)
    pub genre: Option<String>,
}

/// Which lookup a sufficient [`SearchCriteria`] resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Single-record lookup by document id
    DocumentId,
    /// Brief search by ISBN or ISSN
    StandardNumber,
    /// Brief search by title, author and genre
    TitleAuthorGenre,
}

impl SearchCriteria {
    /// Create empty criteria
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Primo document id
    pub fn doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    /// Set the ISBN
    pub fn isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    /// Set the ISSN
    pub fn issn(mut self, issn: impl Into<String>) -> Self {
        self.issn = Some(issn.into());
        self
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the genre
    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Document id, if non-blank
    pub fn doc_id_value(&self) -> Option<&str> {
        present(&self.doc_id)
    }

    /// Decide whether a search may run, and how.
    ///
    /// In priority order: a document id; else an ISBN or ISSN; else title,
    /// author and genre together. Anything else is insufficient.
    pub fn mode(&self) -> Option<SearchMode> {
        if present(&self.doc_id).is_some() {
            Some(SearchMode::DocumentId)
        } else if present(&self.isbn).is_some() || present(&self.issn).is_some() {
            Some(SearchMode::StandardNumber)
        } else if present(&self.title).is_some()
            && present(&self.author).is_some()
            && present(&self.genre).is_some()
        {
            Some(SearchMode::TitleAuthorGenre)
        } else {
            None
        }
    }

    pub fn is_sufficient(&self) -> bool {
        self.mode().is_some()
    }

    /// Whether the query is anchored by an identifier (document id, ISBN or
    /// ISSN). Anchored queries bypass the genre filter.
    pub fn is_anchored(&self) -> bool {
        present(&self.doc_id).is_some()
            || present(&self.isbn).is_some()
            || present(&self.issn).is_some()
    }

    /// Whether a record of `record_genre` belongs in the results.
    ///
    /// A `journal` query also accepts `article` records.
    pub fn accepts_genre(&self, record_genre: &str) -> bool {
        if self.is_anchored() {
            return true;
        }
        match present(&self.genre) {
            None => true,
            Some(genre) => genre == record_genre || (genre == "journal" && record_genre == "article"),
        }
    }

    /// Parameters for a brief search.
    ///
    /// ISBN wins over ISSN. Without either, title is sent when present,
    /// author only alongside title, and genre only alongside title and
    /// author. Author and genre without a title therefore produce no
    /// parameters at all; [`SearchCriteria::mode`] already rejects that case.
    pub fn search_params(&self) -> SearchParams {
        let mut params = SearchParams::default();

        if let Some(isbn) = present(&self.isbn) {
            params.push(SearchField::Isbn, isbn);
        } else if let Some(issn) = present(&self.issn) {
            params.push(SearchField::Issn, issn);
        } else if let Some(title) = present(&self.title) {
            params.push(SearchField::Title, title);
            if let Some(author) = present(&self.author) {
                params.push(SearchField::Author, author);
                if let Some(genre) = present(&self.genre) {
                    params.push(SearchField::Genre, genre);
                }
            }
        }

        params
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// A brief-search field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Isbn,
    Issn,
    Title,
    Author,
    Genre,
}

impl SearchField {
    pub fn name(&self) -> &'static str {
        match self {
            SearchField::Isbn => "isbn",
            SearchField::Issn => "issn",
            SearchField::Title => "title",
            SearchField::Author => "author",
            SearchField::Genre => "genre",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ordered brief-search parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    params: Vec<(SearchField, String)>,
}

impl SearchParams {
    fn push(&mut self, field: SearchField, value: &str) {
        self.params.push((field, value.to_string()));
    }

    pub fn get(&self, field: SearchField) -> Option<&str> {
        self.params
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SearchField, &str)> {
        self.params.iter().map(|(f, value)| (*f, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sufficiency() {
        assert_eq!(SearchCriteria::new().doc_id("x").mode(), Some(SearchMode::DocumentId));
        assert_eq!(SearchCriteria::new().isbn("y").mode(), Some(SearchMode::StandardNumber));
        assert_eq!(SearchCriteria::new().issn("y").mode(), Some(SearchMode::StandardNumber));
        assert_eq!(
            SearchCriteria::new().title("t").author("a").genre("g").mode(),
            Some(SearchMode::TitleAuthorGenre)
        );
        assert!(!SearchCriteria::new().title("t").is_sufficient());
        assert!(!SearchCriteria::new().title("t").author("a").is_sufficient());
        assert!(!SearchCriteria::new().is_sufficient());
    }

    #[test]
    fn test_doc_id_has_priority() {
        let criteria = SearchCriteria::new().isbn("0143039008").doc_id("nyu_aleph000062856");
        assert_eq!(criteria.mode(), Some(SearchMode::DocumentId));
        assert_eq!(criteria.doc_id_value(), Some("nyu_aleph000062856"));
    }

    #[test]
    fn test_blank_values_are_absent() {
        let criteria = SearchCriteria::new().doc_id("").isbn("  ").title("t");
        assert_eq!(criteria.mode(), None);
        assert!(!criteria.is_anchored());
    }

    #[test]
    fn test_isbn_wins_over_issn() {
        let params = SearchCriteria::new().isbn("123").issn("456").search_params();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get(SearchField::Isbn), Some("123"));
        assert_eq!(params.get(SearchField::Issn), None);

        let params = SearchCriteria::new().issn("0002-8614").search_params();
        assert_eq!(params.get(SearchField::Issn), Some("0002-8614"));
    }

    #[test]
    fn test_title_gates_author_and_genre() {
        let params = SearchCriteria::new()
            .title("Travels with My Aunt")
            .author("Graham Greene")
            .genre("Book")
            .search_params();
        let fields: Vec<SearchField> = params.iter().map(|(f, _)| f).collect();
        assert_eq!(
            fields,
            vec![SearchField::Title, SearchField::Author, SearchField::Genre]
        );

        let params = SearchCriteria::new().title("t").genre("g").search_params();
        assert_eq!(params.len(), 1);

        let params = SearchCriteria::new().author("a").genre("g").search_params();
        assert!(params.is_empty());
    }

    #[test]
    fn test_genre_filter() {
        let journal = SearchCriteria::new().title("t").author("a").genre("journal");
        assert!(journal.accepts_genre("article"));
        assert!(journal.accepts_genre("journal"));
        assert!(!journal.accepts_genre("book"));

        let book = SearchCriteria::new().title("t").author("a").genre("Book");
        assert!(!book.accepts_genre("article"));
        assert!(book.accepts_genre("Book"));

        let article = SearchCriteria::new().title("t").author("a").genre("article");
        assert!(!article.accepts_genre("journal"));
    }

    #[test]
    fn test_anchored_queries_bypass_genre_filter() {
        for criteria in [
            SearchCriteria::new().doc_id("x").genre("Book"),
            SearchCriteria::new().isbn("y").genre("Book"),
            SearchCriteria::new().issn("y").genre("Book"),
        ] {
            assert!(criteria.is_anchored());
            assert!(criteria.accepts_genre("article"));
        }
    }
}
