//! PNX response handling: the XML tree, the sub-field codec and the
//! extractors that turn matched documents into records.

mod document;
pub mod extract;
pub mod subfield;

pub use document::{Element, Node, PnxDocument};
pub use extract::{correlate, RecordData, RecordLinks};
pub use subfield::{AvailLibrary, ControlList, Link, LinkToRsrc, SubFields, Tag, CHECK_HOLDINGS};

/// Namespace of PNX bibliographic records
pub const PNX_NS: &str = "http://www.exlibrisgroup.com/xsd/primo/primo_nm_bib";

/// Namespace of the X-Services search envelope
pub const SEARCH_NS: &str = "http://www.exlibrisgroup.com/xsd/jaguar/search";
