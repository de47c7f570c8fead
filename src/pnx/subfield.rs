//! Decoding of Primo's `$$`-delimited sub-field strings.
//!
//! Several PNX leaves pack tagged values into a single text node, for example
//! `$$INYU$$LBOBST$$1Main Collection$$2(PR6013.R44 T7 2004 )$$Scheck_holdings`.
//! Each token following a `$$` marker starts with a one-character tag and the
//! remainder of the token is that tag's value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker separating sub-fields
pub const DELIMITER: &str = "$$";

/// Status given to every holding. The status sub-field sent by Primo is not
/// trusted and is never read.
pub const CHECK_HOLDINGS: &str = "check_holdings";

/// Recognised sub-field tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// `V`: control-list value, or the unused resource "v" field
    Value,
    /// `U`: link URL
    Url,
    /// `D`: link display label
    Display,
    /// `I`: institution code
    Institution,
    /// `L`: library code
    Library,
    /// `1`: collection / shelf area
    IdOne,
    /// `2`: call number
    IdTwo,
    /// `O`: origin token of a merged source record
    Origin,
    /// `S`: status code
    Status,
}

impl Tag {
    /// Tag for a single-character code
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'V' => Some(Tag::Value),
            'U' => Some(Tag::Url),
            'D' => Some(Tag::Display),
            'I' => Some(Tag::Institution),
            'L' => Some(Tag::Library),
            '1' => Some(Tag::IdOne),
            '2' => Some(Tag::IdTwo),
            'O' => Some(Tag::Origin),
            'S' => Some(Tag::Status),
            _ => None,
        }
    }

    /// Single-character code for this tag
    pub fn code(&self) -> char {
        match self {
            Tag::Value => 'V',
            Tag::Url => 'U',
            Tag::Display => 'D',
            Tag::Institution => 'I',
            Tag::Library => 'L',
            Tag::IdOne => '1',
            Tag::IdTwo => '2',
            Tag::Origin => 'O',
            Tag::Status => 'S',
        }
    }
}

/// The decoded (tag, value) pairs of one encoded string, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubFields {
    pairs: Vec<(Tag, String)>,
}

impl SubFields {
    /// Decode an encoded string. Text before the first marker and tokens
    /// with an unrecognised tag are ignored.
    pub fn parse(raw: &str) -> Self {
        let pairs = raw
            .split(DELIMITER)
            .skip(1)
            .filter_map(split_token)
            .collect();
        Self { pairs }
    }

    /// Value for `tag`. When a tag repeats, the last occurrence wins.
    pub fn get(&self, tag: Tag) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(t, _)| *t == tag)
            .map(|(_, value)| value.as_str())
    }

    /// Owned copy of [`SubFields::get`]
    pub fn get_owned(&self, tag: Tag) -> Option<String> {
        self.get(tag).map(str::to_string)
    }

    /// Iterate over the decoded pairs in input order
    pub fn iter(&self) -> impl Iterator<Item = (Tag, &str)> {
        self.pairs.iter().map(|(tag, value)| (*tag, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(Tag, String)> for SubFields {
    fn from_iter<I: IntoIterator<Item = (Tag, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for SubFields {
    /// Re-encode as `$$<tag><value>` pairs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (tag, value) in &self.pairs {
            write!(f, "{}{}{}", DELIMITER, tag.code(), value)?;
        }
        Ok(())
    }
}

fn split_token(token: &str) -> Option<(Tag, String)> {
    let mut chars = token.chars();
    let tag = Tag::from_code(chars.next()?)?;
    Some((tag, chars.as_str().to_string()))
}

fn decode(raw: Option<&str>) -> SubFields {
    raw.map(SubFields::parse).unwrap_or_default()
}

/// A decoded `display/availlibrary` value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailLibrary {
    pub raw: Option<String>,
    pub institution_code: Option<String>,
    pub library_code: Option<String>,
    pub id_one: Option<String>,
    pub id_two: Option<String>,
    pub origin: Option<String>,
}

impl AvailLibrary {
    pub fn decode(raw: Option<&str>) -> Self {
        let fields = decode(raw);
        Self {
            raw: raw.map(str::to_string),
            institution_code: fields.get_owned(Tag::Institution),
            library_code: fields.get_owned(Tag::Library),
            id_one: fields.get_owned(Tag::IdOne),
            id_two: fields.get_owned(Tag::IdTwo),
            origin: fields.get_owned(Tag::Origin),
        }
    }

    /// Always [`CHECK_HOLDINGS`], whatever `$$S` says
    pub fn status_code(&self) -> &'static str {
        CHECK_HOLDINGS
    }
}

/// A decoded `links/linktorsrc` value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkToRsrc {
    pub raw: Option<String>,
    pub v: Option<String>,
    pub url: Option<String>,
    pub display: Option<String>,
    pub institution_code: Option<String>,
    pub origin: Option<String>,
}

impl LinkToRsrc {
    pub fn decode(raw: Option<&str>) -> Self {
        let fields = decode(raw);
        Self {
            raw: raw.map(str::to_string),
            v: fields.get_owned(Tag::Value),
            url: fields.get_owned(Tag::Url),
            display: fields.get_owned(Tag::Display),
            institution_code: fields.get_owned(Tag::Institution),
            origin: fields.get_owned(Tag::Origin),
        }
    }
}

/// A decoded `links/linktotoc` or `links/addlink` value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub raw: Option<String>,
    pub url: Option<String>,
    pub display: Option<String>,
}

impl Link {
    pub fn decode(raw: Option<&str>) -> Self {
        let fields = decode(raw);
        Self {
            raw: raw.map(str::to_string),
            url: fields.get_owned(Tag::Url),
            display: fields.get_owned(Tag::Display),
        }
    }
}

/// Origin token → value mapping built from a repeated control field
/// (`sourceid`, `sourcerecordid`, `originalsourceid`).
///
/// A merged record carries one element per source, each encoded as
/// `$$V<value>$$O<origin>`. Elements missing either half are skipped, so an
/// unencoded single value (e.g. `nyu_aleph`) yields an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlList(IndexMap<String, String>);

impl ControlList {
    pub fn decode<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = IndexMap::new();
        for raw in values {
            let fields = SubFields::parse(raw);
            if let (Some(origin), Some(value)) = (fields.get(Tag::Origin), fields.get(Tag::Value)) {
                map.insert(origin.to_string(), value.to_string());
            }
        }
        Self(map)
    }

    pub fn get(&self, origin: &str) -> Option<&str> {
        self.0.get(origin).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
