//! Extraction of records from a parsed Primo response.
//!
//! [`RecordData::extract`] reads the record-level display metadata used when a
//! single document is requested. [`RecordLinks::extract`] walks every matched
//! `record` element and builds holdings, full-text resources, tables of
//! contents and related links from their encoded sub-fields.
//!
//! A merged (deduplicated) document carries one `sourceid`, `sourcerecordid`
//! and `originalsourceid` element per source record, each tagged with an
//! origin token. Every holding is matched back to its own source through that
//! token, see [`correlate`].

use indexmap::IndexMap;
use serde::Serialize;

use super::document::{Element, PnxDocument};
use super::subfield::{AvailLibrary, ControlList, Link, LinkToRsrc, CHECK_HOLDINGS};
use super::{PNX_NS, SEARCH_NS};
use crate::config::Setup;
use crate::models::{Holding, RelatedLink, Resource, SearchCriteria, TableOfContents, DEFAULT_GENRE};

/// `TOTALHITS` of the first result set in the response
pub fn total_hits(doc: &PnxDocument) -> Option<u64> {
    let raw = doc.find(SEARCH_NS, "DOCSET")?.attribute("TOTALHITS")?;
    match raw.trim().parse() {
        Ok(count) => Some(count),
        Err(_) => {
            tracing::warn!(value = raw, "Ignoring non-numeric TOTALHITS");
            None
        }
    }
}

/// Record-level metadata of a single-document response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordData {
    /// Every non-empty `addata` child, keyed by local tag name. A repeated
    /// tag keeps its first position and its last value.
    pub fields: IndexMap<String, String>,

    /// `addata/lad02`
    pub cover_image: Option<String>,

    /// Every `display/title`, in document order
    pub titles: Vec<String>,

    /// Every `display/creator`, in document order
    pub authors: Vec<String>,
}

impl RecordData {
    pub fn extract(doc: &PnxDocument) -> Self {
        let mut fields = IndexMap::new();
        if let Some(addata) = doc.find(PNX_NS, "addata") {
            for child in addata.elements() {
                let value = child.text();
                if !value.is_empty() {
                    fields.insert(child.name().to_string(), value);
                }
            }
        }

        let addata = doc.descendants(PNX_NS, "addata");
        let cover_image = addata
            .iter()
            .flat_map(|element| element.children(PNX_NS, "lad02"))
            .next()
            .map(Element::text);

        let display = doc.descendants(PNX_NS, "display");
        let titles = display
            .iter()
            .flat_map(|element| element.children(PNX_NS, "title"))
            .map(Element::text)
            .collect();
        let authors = display
            .iter()
            .flat_map(|element| element.children(PNX_NS, "creator"))
            .map(Element::text)
            .collect();

        Self {
            fields,
            cover_image,
            titles,
            authors,
        }
    }
}

/// Resolve a control-list value for one holding.
///
/// Looks up `origin`, or `record_id` when the holding has no origin, and
/// falls back to the record-level `scalar` when the list is empty or has no
/// entry for that key.
pub fn correlate(list: &ControlList, origin: Option<&str>, record_id: &str, scalar: &str) -> String {
    if list.is_empty() {
        return scalar.to_string();
    }
    let key = origin.unwrap_or(record_id);
    list.get(key).unwrap_or(scalar).to_string()
}

/// Records built from every matched document of a response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordLinks {
    pub holdings: Vec<Holding>,
    pub resources: Vec<Resource>,
    pub tables_of_contents: Vec<TableOfContents>,
    pub related_links: Vec<RelatedLink>,
}

impl RecordLinks {
    pub fn extract(doc: &PnxDocument, criteria: &SearchCriteria, setup: &Setup) -> Self {
        let mut links = Self::default();

        for record in doc.descendants(PNX_NS, "record") {
            let genre = record
                .select_first(PNX_NS, "addata/genre")
                .map(Element::text)
                .unwrap_or_else(|| DEFAULT_GENRE.to_string());
            if !criteria.accepts_genre(&genre) {
                tracing::debug!(genre = %genre, "Skipping record with non-matching genre");
                continue;
            }

            let context = RecordContext::new(record);
            links.push_holdings(record, &context, setup);
            links.push_resources(record, &context);
            links.push_tables_of_contents(record, &context);
            links.push_related_links(record, &context);
        }

        tracing::debug!(
            holdings = links.holdings.len(),
            resources = links.resources.len(),
            tables_of_contents = links.tables_of_contents.len(),
            related_links = links.related_links.len(),
            "Extracted PNX records"
        );
        links
    }

    fn push_holdings(&mut self, record: &Element, context: &RecordContext, setup: &Setup) {
        for element in record.select(PNX_NS, "display/availlibrary") {
            let text = element.text();
            let avail = AvailLibrary::decode(Some(&text));
            self.holdings.push(context.holding(avail, setup));
        }
    }

    fn push_resources(&mut self, record: &Element, context: &RecordContext) {
        for element in record.select(PNX_NS, "links/linktorsrc") {
            let text = element.text();
            let link = LinkToRsrc::decode(Some(&text));
            if let Some(url) = non_empty(link.url) {
                self.resources.push(Resource {
                    record_id: context.record_id.clone(),
                    linktorsrc: link.raw,
                    v: link.v,
                    url,
                    display: link.display,
                    institution_code: link.institution_code,
                    origin: link.origin,
                    notes: String::new(),
                });
            }
        }
    }

    fn push_tables_of_contents(&mut self, record: &Element, context: &RecordContext) {
        for element in record.select(PNX_NS, "links/linktotoc") {
            let text = element.text();
            let link = Link::decode(Some(&text));
            if let Some(url) = non_empty(link.url) {
                self.tables_of_contents.push(TableOfContents {
                    record_id: context.record_id.clone(),
                    linktotoc: link.raw,
                    url,
                    display: link.display,
                    notes: String::new(),
                });
            }
        }
    }

    fn push_related_links(&mut self, record: &Element, context: &RecordContext) {
        for element in record.select(PNX_NS, "links/addlink") {
            let text = element.text();
            let link = Link::decode(Some(&text));
            if let Some(url) = non_empty(link.url) {
                self.related_links.push(RelatedLink {
                    record_id: context.record_id.clone(),
                    addlink: link.raw,
                    url,
                    display: link.display,
                    notes: String::new(),
                });
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Record-level values shared by every holding of one document
struct RecordContext {
    record_id: String,
    title: String,
    author: String,
    display_type: String,
    source_id: String,
    source_ids: ControlList,
    source_record_id: String,
    source_record_ids: ControlList,
    original_source_id: String,
    original_source_ids: ControlList,
}

impl RecordContext {
    fn new(record: &Element) -> Self {
        let control_list = |path: &str| {
            let texts: Vec<String> = record.select(PNX_NS, path).into_iter().map(Element::text).collect();
            ControlList::decode(texts.iter().map(String::as_str))
        };

        Self {
            record_id: record.select_text(PNX_NS, "control/recordid"),
            title: record.select_text(PNX_NS, "display/title"),
            author: record.select_text(PNX_NS, "display/creator"),
            display_type: record.select_text(PNX_NS, "display/type"),
            source_id: record.select_text(PNX_NS, "control/sourceid"),
            source_ids: control_list("control/sourceid"),
            source_record_id: record.select_text(PNX_NS, "control/sourcerecordid"),
            source_record_ids: control_list("control/sourcerecordid"),
            original_source_id: record.select_text(PNX_NS, "control/originalsourceid"),
            original_source_ids: control_list("control/originalsourceid"),
        }
    }

    fn holding(&self, avail: AvailLibrary, setup: &Setup) -> Holding {
        let origin = avail.origin.as_deref();
        let source_id = correlate(&self.source_ids, origin, &self.record_id, &self.source_id);
        let source_record_id = correlate(
            &self.source_record_ids,
            origin,
            &self.record_id,
            &self.source_record_id,
        );
        let original_source_id = correlate(
            &self.original_source_ids,
            origin,
            &self.record_id,
            &self.original_source_id,
        );

        let library = avail.library_code.as_deref().map(|code| {
            setup
                .config
                .library_display(code)
                .unwrap_or(code)
                .to_string()
        });
        let status_code = avail.status_code();
        let status = setup
            .config
            .status_display(status_code)
            .unwrap_or(status_code)
            .to_string();
        let institution = avail
            .institution_code
            .as_deref()
            .unwrap_or(&setup.institution);
        let url = Holding::display_url(&setup.base_url, institution, &setup.vid, &self.record_id);

        Holding {
            record_id: self.record_id.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            display_type: self.display_type.clone(),
            origin: avail.origin,
            availlibrary: avail.raw,
            institution_code: avail.institution_code,
            library_code: avail.library_code,
            library,
            id_one: avail.id_one,
            id_two: avail.id_two,
            status_code: CHECK_HOLDINGS.to_string(),
            status,
            source_id,
            source_record_id,
            original_source_id,
            coverage: Vec::new(),
            notes: String::new(),
            url,
            request_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrimoConfig;

    fn setup() -> Setup {
        Setup::builder()
            .base_url("http://bobcat.library.nyu.edu")
            .institution("NYU")
            .vid("NYU")
            .build()
            .unwrap()
    }

    fn response(records: &[&str]) -> PnxDocument {
        let docs: String = records
            .iter()
            .map(|record| {
                format!(
                    r#"<sear:DOC><PrimoNMBib xmlns="http://www.exlibrisgroup.com/xsd/primo/primo_nm_bib">{}</PrimoNMBib></sear:DOC>"#,
                    record
                )
            })
            .collect();
        let xml = format!(
            r#"<sear:SEGMENTS xmlns:sear="http://www.exlibrisgroup.com/xsd/jaguar/search"><sear:JAGROOT><sear:RESULT><sear:DOCSET TOTALHITS="{}">{}</sear:DOCSET></sear:RESULT></sear:JAGROOT></sear:SEGMENTS>"#,
            records.len(),
            docs
        );
        PnxDocument::parse(&xml).unwrap()
    }

    const BOOK: &str = r#"<record>
        <control>
            <sourcerecordid>000062856</sourcerecordid>
            <sourceid>nyu_aleph</sourceid>
            <recordid>nyu_aleph000062856</recordid>
            <originalsourceid>NYU01</originalsourceid>
        </control>
        <display>
            <type>book</type>
            <title>Travels with my aunt</title>
            <creator>Graham  Greene  1904-1991.</creator>
            <availlibrary>$$INYU$$LBOBST$$1Main Collection$$2(PR6013.R44 T7 2004 )$$Savailable</availlibrary>
        </display>
        <links>
            <linktorsrc>$$Uhttp://example.com/fulltext$$DOnline Version$$INYU</linktorsrc>
            <linktorsrc>$$DNo URL here</linktorsrc>
            <linktotoc>$$Uhttp://www.loc.gov/catdir/toc/2001024342.html$$DTable of Contents</linktotoc>
            <addlink>$$Uhttp://example.com/related$$DRelated</addlink>
            <addlink>$$U$$DEmpty URL</addlink>
        </links>
        <addata>
            <au>Greene, Graham</au>
            <btitle>Travels with my aunt</btitle>
            <genre>book</genre>
            <isbn>0143039008</isbn>
            <lad02>http://covers.example/0143039008.jpg</lad02>
            <notes></notes>
        </addata>
    </record>"#;

    const MERGED: &str = r#"<record>
        <control>
            <sourcerecordid>$$V000932393$$Onyu_aleph000932393</sourcerecordid>
            <sourcerecordid>$$V954925427$$Onyu_sfx954925427</sourcerecordid>
            <sourceid>$$Vnyu_aleph$$Onyu_aleph000932393</sourceid>
            <sourceid>$$Vnyu_sfx$$Onyu_sfx954925427</sourceid>
            <recordid>dedupmrg17343091</recordid>
            <originalsourceid>$$VNYU01$$Onyu_aleph000932393</originalsourceid>
            <originalsourceid>$$VNYU_SFX$$Onyu_sfx954925427</originalsourceid>
        </control>
        <display>
            <type>journal</type>
            <title>The New York times</title>
            <availlibrary>$$INYU$$LBWEB$$1Internet Resources$$2(Newspaper Electronic access )$$Scheck_holdings$$Onyu_aleph000932393</availlibrary>
            <availlibrary>$$INYU$$LSFX$$1Online$$2(e-journal)$$Onyu_sfx954925427</availlibrary>
            <availlibrary>$$INYU$$LBOBST$$1Microfilm</availlibrary>
        </display>
        <links>
            <linktorsrc>$$V$$Uhttp://proquest.example/pqdweb$$D1995 - Current Access via Proquest$$INYU$$Onyu_aleph000932393</linktorsrc>
        </links>
        <addata><genre>journal</genre></addata>
    </record>"#;

    #[test]
    fn test_total_hits() {
        assert_eq!(total_hits(&response(&[BOOK, MERGED])), Some(2));
        let bad = PnxDocument::parse(
            r#"<DOCSET xmlns="http://www.exlibrisgroup.com/xsd/jaguar/search" TOTALHITS="many"/>"#,
        )
        .unwrap();
        assert_eq!(total_hits(&bad), None);
    }

    #[test]
    fn test_record_data() {
        let data = RecordData::extract(&response(&[BOOK]));
        assert_eq!(data.fields.get("au").map(String::as_str), Some("Greene, Graham"));
        assert_eq!(data.fields.get("btitle").map(String::as_str), Some("Travels with my aunt"));
        assert!(!data.fields.contains_key("notes"));
        let keys: Vec<&str> = data.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["au", "btitle", "genre", "isbn", "lad02"]);
        assert_eq!(
            data.cover_image.as_deref(),
            Some("http://covers.example/0143039008.jpg")
        );
        assert_eq!(data.titles, vec!["Travels with my aunt"]);
        assert_eq!(data.authors, vec!["Graham  Greene  1904-1991."]);
    }

    #[test]
    fn test_single_record_links() {
        let criteria = SearchCriteria::new().doc_id("nyu_aleph000062856");
        let links = RecordLinks::extract(&response(&[BOOK]), &criteria, &setup());

        assert_eq!(links.holdings.len(), 1);
        let holding = &links.holdings[0];
        assert_eq!(holding.record_id, "nyu_aleph000062856");
        assert_eq!(holding.title, "Travels with my aunt");
        assert_eq!(holding.author, "Graham  Greene  1904-1991.");
        assert_eq!(holding.display_type, "book");
        assert_eq!(holding.source_id, "nyu_aleph");
        assert_eq!(holding.source_record_id, "000062856");
        assert_eq!(holding.original_source_id, "NYU01");
        assert_eq!(holding.institution(), Some("NYU"));
        assert_eq!(holding.library.as_deref(), Some("BOBST"));
        assert_eq!(holding.collection(), Some("Main Collection"));
        assert_eq!(holding.call_number(), Some("(PR6013.R44 T7 2004 )"));
        assert_eq!(holding.status_code, CHECK_HOLDINGS);
        assert_eq!(holding.status, CHECK_HOLDINGS);
        assert_eq!(holding.origin, None);
        assert!(holding.coverage.is_empty());
        assert_eq!(holding.notes, "");
        assert_eq!(
            holding.url,
            "http://bobcat.library.nyu.edu/primo_library/libweb/action/dlDisplay.do?docId=nyu_aleph000062856&institution=NYU&vid=NYU"
        );

        assert_eq!(links.resources.len(), 1);
        assert_eq!(links.resources[0].url, "http://example.com/fulltext");
        assert_eq!(links.resources[0].display.as_deref(), Some("Online Version"));
        assert_eq!(links.resources[0].v, None);

        assert_eq!(links.tables_of_contents.len(), 1);
        assert_eq!(links.tables_of_contents[0].display.as_deref(), Some("Table of Contents"));

        assert_eq!(links.related_links.len(), 1);
        assert_eq!(links.related_links[0].url, "http://example.com/related");
    }

    #[test]
    fn test_merged_record_correlates_origins() {
        let criteria = SearchCriteria::new().doc_id("dedupmrg17343091");
        let links = RecordLinks::extract(&response(&[MERGED]), &criteria, &setup());

        assert_eq!(links.holdings.len(), 3);

        let aleph = &links.holdings[0];
        assert_eq!(aleph.origin.as_deref(), Some("nyu_aleph000932393"));
        assert_eq!(aleph.source_id, "nyu_aleph");
        assert_eq!(aleph.source_record_id, "000932393");
        assert_eq!(aleph.original_source_id, "NYU01");
        assert_eq!(aleph.author, "");

        let sfx = &links.holdings[1];
        assert_eq!(sfx.origin.as_deref(), Some("nyu_sfx954925427"));
        assert_eq!(sfx.source_id, "nyu_sfx");
        assert_eq!(sfx.source_record_id, "954925427");
        assert_eq!(sfx.original_source_id, "NYU_SFX");

        // No origin: keyed by record id, which the lists lack, so the first
        // raw control value is used.
        let unkeyed = &links.holdings[2];
        assert_eq!(unkeyed.origin, None);
        assert_eq!(unkeyed.source_record_id, "$$V000932393$$Onyu_aleph000932393");

        assert_eq!(links.resources.len(), 1);
        assert_eq!(links.resources[0].v.as_deref(), Some(""));
        assert_eq!(links.resources[0].origin.as_deref(), Some("nyu_aleph000932393"));
    }

    #[test]
    fn test_correlate() {
        let list = ControlList::decode(["$$Vid1$$OO1", "$$Vid2$$OO2", "$$Vself$$Orec1"]);
        assert_eq!(correlate(&list, Some("O2"), "rec1", "scalar"), "id2");
        assert_eq!(correlate(&list, Some("O1"), "rec1", "scalar"), "id1");
        assert_eq!(correlate(&list, None, "rec1", "scalar"), "self");
        assert_eq!(correlate(&list, Some("O3"), "rec1", "scalar"), "scalar");
        assert_eq!(correlate(&ControlList::default(), Some("O1"), "rec1", "scalar"), "scalar");
    }

    #[test]
    fn test_origin_keyed_holdings_unaffected_by_record_id_fallback() {
        // Several control entries, and every holding carries its own origin.
        let record = r#"<record>
            <control>
                <recordid>rec1</recordid>
                <sourcerecordid>$$Vid1$$OO1</sourcerecordid>
                <sourcerecordid>$$Vid2$$OO2</sourcerecordid>
                <sourcerecordid>$$Vwrong$$Orec1</sourcerecordid>
            </control>
            <display>
                <availlibrary>$$INYU$$LA$$OO1</availlibrary>
                <availlibrary>$$INYU$$LB$$OO2</availlibrary>
            </display>
        </record>"#;
        let criteria = SearchCriteria::new().doc_id("rec1");
        let links = RecordLinks::extract(&response(&[record]), &criteria, &setup());
        let ids: Vec<&str> = links
            .holdings
            .iter()
            .map(|h| h.source_record_id.as_str())
            .collect();
        assert_eq!(ids, vec!["id1", "id2"]);
    }

    #[test]
    fn test_genre_filter() {
        let book_query = SearchCriteria::new().title("t").author("a").genre("book");
        let links = RecordLinks::extract(&response(&[BOOK, MERGED]), &book_query, &setup());
        assert_eq!(links.holdings.len(), 1);
        assert_eq!(links.holdings[0].record_id, "nyu_aleph000062856");

        // A record without addata/genre counts as an article
        let no_genre = r#"<record><control><recordid>art1</recordid></control>
            <display><availlibrary>$$INYU$$LBOBST</availlibrary></display></record>"#;
        let journal_query = SearchCriteria::new().title("t").author("a").genre("journal");
        let links = RecordLinks::extract(&response(&[BOOK, MERGED, no_genre]), &journal_query, &setup());
        let ids: Vec<&str> = links.holdings.iter().map(|h| h.record_id.as_str()).collect();
        assert_eq!(ids, vec!["dedupmrg17343091", "dedupmrg17343091", "dedupmrg17343091", "art1"]);

        let isbn_query = SearchCriteria::new().isbn("0143039008").genre("journal");
        let links = RecordLinks::extract(&response(&[BOOK, MERGED]), &isbn_query, &setup());
        assert_eq!(links.holdings.len(), 4);
    }

    #[test]
    fn test_display_names_from_config() {
        let mut config = PrimoConfig::default();
        config.libraries.insert("BOBST".to_string(), "NYU Bobst".to_string());
        config
            .statuses
            .insert(CHECK_HOLDINGS.to_string(), "Check Availability".to_string());
        let setup = Setup::builder()
            .base_url("http://bobcat.library.nyu.edu")
            .institution("NYU")
            .config(config)
            .build()
            .unwrap();

        let links = RecordLinks::extract(&response(&[BOOK]), &SearchCriteria::new().doc_id("x"), &setup);
        let holding = &links.holdings[0];
        assert_eq!(holding.library_code.as_deref(), Some("BOBST"));
        assert_eq!(holding.library.as_deref(), Some("NYU Bobst"));
        assert_eq!(holding.status_code, CHECK_HOLDINGS);
        assert_eq!(holding.status, "Check Availability");
        assert!(holding.url.ends_with("vid=DEFAULT"));
    }
}
