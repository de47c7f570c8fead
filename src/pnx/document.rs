//! Owned, namespace-resolved XML tree for Primo responses.
//!
//! Primo answers with a `search`-namespace envelope wrapping one or more
//! `pnx`-namespace records. The extractors need relative path queries and
//! document-wide lookups against both namespaces, so the response is read once
//! with quick-xml's [`NsReader`] into a small tree of [`Element`]s.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::str::FromStr;

use crate::web_service::ServiceError;

/// A child of an [`Element`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its resolved namespace URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn from_start(namespace: Option<String>, start: &BytesStart<'_>) -> Result<Self, ServiceError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ServiceError::Parse(format!("XML attribute: {}", e)))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| ServiceError::Parse(format!("XML attribute value: {}", e)))?;
            attributes.push((key, value.into_owned()));
        }

        Ok(Self {
            namespace,
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Namespace URI, if the element is bound to one
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Local tag name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this element has the given namespace and local name
    pub fn is(&self, ns: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(ns)
    }

    /// Attribute value by local name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated text of this element and all of its descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Immediate child elements, in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Immediate child elements matching namespace and local name
    pub fn children<'a, 'b>(
        &'a self,
        ns: &'b str,
        name: &'b str,
    ) -> impl Iterator<Item = &'a Element> + 'b
    where
        'a: 'b,
    {
        self.elements().filter(move |element| element.is(ns, name))
    }

    /// Elements reached by a relative, slash-separated path of local names
    /// that all live in `ns` (e.g. `"control/sourceid"`).
    pub fn select<'a>(&'a self, ns: &str, path: &str) -> Vec<&'a Element> {
        let mut current = vec![self];
        for step in path.split('/').filter(|step| !step.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|element| element.elements().filter(move |child| child.is(ns, step)))
                .collect();
        }
        current
    }

    /// First element reached by [`Element::select`]
    pub fn select_first<'a>(&'a self, ns: &str, path: &str) -> Option<&'a Element> {
        self.select(ns, path).into_iter().next()
    }

    /// Text of the first element reached by `path`, or an empty string
    pub fn select_text(&self, ns: &str, path: &str) -> String {
        self.select_first(ns, path)
            .map(Element::text)
            .unwrap_or_default()
    }

    /// All descendant elements (not including `self`) matching namespace and
    /// local name, in document order
    pub fn descendants<'a>(&'a self, ns: &str, name: &str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        self.collect_descendants(ns, name, &mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, ns: &str, name: &str, out: &mut Vec<&'a Element>) {
        for element in self.elements() {
            if element.is(ns, name) {
                out.push(element);
            }
            element.collect_descendants(ns, name, out);
        }
    }
}

/// A parsed Primo response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PnxDocument {
    root: Element,
}

impl PnxDocument {
    /// Parse a response body
    pub fn parse(xml: &str) -> Result<Self, ServiceError> {
        let mut reader = NsReader::from_str(xml);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (resolved, event) = reader
                .read_resolved_event()
                .map_err(|e| ServiceError::Parse(format!("XML parsing error: {}", e)))?;
            let namespace = match resolved {
                ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
                _ => None,
            };

            match event {
                Event::Start(ref e) => {
                    stack.push(Element::from_start(namespace, e)?);
                }
                Event::Empty(ref e) => {
                    let element = Element::from_start(namespace, e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        ServiceError::Parse("Unbalanced closing tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    let text = e
                        .unescape()
                        .map_err(|e| ServiceError::Parse(format!("XML text: {}", e)))?;
                    push_text(&mut stack, text.into_owned());
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    push_text(&mut stack, text);
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctypes
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(ServiceError::Parse("Unexpected end of document".to_string()));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| ServiceError::Parse("Document has no root element".to_string()))
    }

    /// Parse a response body given as raw bytes
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, ServiceError> {
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| ServiceError::Parse(format!("Response is not UTF-8: {}", e)))?;
        Self::parse(xml)
    }

    /// The document element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Every element in the document (root included) matching namespace and
    /// local name, in document order
    pub fn descendants<'a>(&'a self, ns: &str, name: &str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        if self.root.is(ns, name) {
            out.push(&self.root);
        }
        out.extend(self.root.descendants(ns, name));
        out
    }

    /// First element anywhere in the document matching namespace and local name
    pub fn find<'a>(&'a self, ns: &str, name: &str) -> Option<&'a Element> {
        self.descendants(ns, name).into_iter().next()
    }
}

impl FromStr for PnxDocument {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ServiceError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(ServiceError::Parse(
                "Multiple root elements in document".to_string(),
            ))
        }
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: String) {
    // Indentation between elements; leaf values are kept as written
    if text.trim().is_empty() {
        return;
    }
    // Text outside the root element is ignored
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS_A: &str = "urn:a";
    const NS_B: &str = "urn:b";

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<a:root xmlns:a="urn:a" xmlns:b="urn:b" COUNT="2">
    <b:item><b:name>first</b:name><b:tag>x</b:tag></b:item>
    <b:item><b:name>second &amp; last</b:name></b:item>
    <a:empty/>
    <b:note><![CDATA[raw <text>]]></b:note>
</a:root>"#;

    #[test]
    fn test_parse_resolves_namespaces() {
        let doc = PnxDocument::parse(SAMPLE).unwrap();
        assert!(doc.root().is(NS_A, "root"));
        assert_eq!(doc.root().attribute("COUNT"), Some("2"));
        assert_eq!(doc.root().children(NS_B, "item").count(), 2);
        assert_eq!(doc.root().children(NS_A, "item").count(), 0);
    }

    #[test]
    fn test_select_and_text() {
        let doc = PnxDocument::parse(SAMPLE).unwrap();
        let names: Vec<String> = doc
            .root()
            .select(NS_B, "item/name")
            .into_iter()
            .map(Element::text)
            .collect();
        assert_eq!(names, vec!["first", "second & last"]);
        assert_eq!(doc.root().select_text(NS_B, "item/tag"), "x");
        assert_eq!(doc.root().select_text(NS_B, "item/missing"), "");
    }

    #[test]
    fn test_descendants_and_find() {
        let doc = PnxDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.descendants(NS_B, "name").len(), 2);
        assert_eq!(doc.descendants(NS_A, "root").len(), 1);
        assert!(doc.find(NS_A, "empty").is_some());
        assert_eq!(doc.find(NS_B, "note").map(Element::text).as_deref(), Some("raw <text>"));
        assert_eq!(doc.root().text(), "firstxsecond & lastraw <text>");
    }

    #[test]
    fn test_leaf_whitespace_is_kept() {
        let doc = PnxDocument::parse(
            "<a xmlns=\"urn:a\">\n  <title>Foo <b>bar</b></title>\n  <v>$$Vvalue $$Oorigin </v>\n</a>",
        )
        .unwrap();
        assert_eq!(doc.root().select_text(NS_A, "title"), "Foo bar");
        assert_eq!(doc.root().select_text(NS_A, "v"), "$$Vvalue $$Oorigin ");
    }

    #[test]
    fn test_children_outlive_query_strings() {
        let doc = PnxDocument::parse(SAMPLE).unwrap();
        let items: Vec<&Element> = {
            let name = String::from("item");
            doc.root().select(NS_B, &name)
        };
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_parse_errors() {
        assert!(PnxDocument::parse("").is_err());
        assert!(PnxDocument::parse("<a><b></a>").is_err());
        assert!(PnxDocument::parse("<a>").is_err());
        assert!(PnxDocument::parse_bytes(&[0xff, 0xfe]).is_err());
    }
}
