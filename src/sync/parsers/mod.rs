// src/sync/parsers/mod.rs

//! Document parsers
//!
//! Every remote document is turned into validated records here, before any
//! reconciler touches the database. The parsers decide once what is merely
//! unfamiliar (ignored, logged at debug), what is incomplete (the record is
//! dropped or rejected) and what is structurally wrong (`ParseError`).
//!
//! - [`catalog`]: packages.gentoo.org JSON (categories, package lists,
//!   package details)
//! - [`projects`]: the `projects.xml` project hierarchy
//! - [`pkgcheck`]: the pkgcheck XML report

pub mod catalog;
pub mod pkgcheck;
pub mod projects;

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Whether a maintainer reference names a person or a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintainerKind {
    Person,
    Project,
}

impl MaintainerKind {
    /// Parse the `type` field of a catalog maintainer entry
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "person" | "individual" => Some(Self::Person),
            "project" => Some(Self::Project),
            _ => None,
        }
    }

    pub fn is_project(self) -> bool {
        self == Self::Project
    }
}

/// A parsed XML element with its attributes, text and child elements
///
/// The XML documents consumed here are small enough to hold in memory, and
/// walking a tree keeps the "skip unknown tags" rule in one place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_start(start: &BytesStart) -> Result<Self> {
        let mut node = XmlNode {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Default::default()
        };

        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::ParseError(format!("Invalid XML attribute: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::ParseError(format!("Invalid XML attribute value: {e}")))?
                .into_owned();
            node.attributes.push((key, value));
        }

        Ok(node)
    }

    /// Value of an attribute, if present
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child element with the given tag
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Trimmed text of the first child with the given tag, if not blank
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).and_then(XmlNode::trimmed_text)
    }

    /// Trimmed text content, if not blank
    pub fn trimmed_text(&self) -> Option<String> {
        let text = self.text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Parse an XML document into a tree, checking the root tag
pub fn parse_xml_tree(body: &str, expected_root: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(XmlNode::from_start(&e)?),
            Ok(Event::Empty(e)) => {
                let node = XmlNode::from_start(&e)?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| Error::ParseError("Unbalanced XML end tag".to_string()))?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::Text(t)) => {
                if let Some(current) = stack.last_mut() {
                    // Unknown entities are kept verbatim rather than failing the document
                    match t.unescape() {
                        Ok(text) => current.text.push_str(&text),
                        Err(_) => current.text.push_str(&String::from_utf8_lossy(&t)),
                    }
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, doctype, comments and processing instructions
            Ok(_) => {}
            Err(e) => {
                return Err(Error::ParseError(format!(
                    "Malformed XML at position {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    if !stack.is_empty() {
        return Err(Error::ParseError(format!(
            "Unexpected end of XML inside <{}>",
            stack.last().map(|n| n.name.as_str()).unwrap_or_default()
        )));
    }

    let root =
        root.ok_or_else(|| Error::ParseError("XML document has no root element".to_string()))?;
    if root.name != expected_root {
        return Err(Error::ParseError(format!(
            "Expected <{}> root element, found <{}>",
            expected_root, root.name
        )));
    }
    Ok(root)
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_none() {
        *root = Some(node);
    } else {
        return Err(Error::ParseError(format!(
            "Unexpected second root element <{}>",
            node.name
        )));
    }
    Ok(())
}

/// Interpret an XML boolean flag (`1`, `true`, `yes`)
pub(crate) fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}
