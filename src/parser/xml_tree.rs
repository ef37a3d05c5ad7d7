//! Generic XML element tree reader.
//!
//! `.keylayout` files are plain XML. This module turns a document into a small
//! owned element tree so the layout model can be built from node/attribute
//! accessors without knowing anything about the XML reader itself.

use anyhow::{bail, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

/// A single XML element with its attributes and child elements.
///
/// Text content, comments, DOCTYPE declarations and processing instructions
/// are dropped while reading; keylayout data lives entirely in attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlNode {
    /// Element name (e.g., "keyMap")
    pub name: String,
    /// Attributes in document order, values already unescaped
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Creates an element with no attributes and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the value of the first attribute named `key`.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over the direct children named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// Parses an XML document and returns its root element.
///
/// # Examples
///
/// ```
/// use keylegend::parser::xml_tree::parse_xml_tree;
///
/// let root = parse_xml_tree(r#"<keyboard name="Test"><actions/></keyboard>"#).unwrap();
/// assert_eq!(root.name, "keyboard");
/// assert_eq!(root.attr("name"), Some("Test"));
/// assert_eq!(root.children_named("actions").count(), 1);
/// ```
pub fn parse_xml_tree(xml: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("Malformed XML near byte {}", reader.buffer_position()))?;

        match event {
            Event::Start(start) => stack.push(element_from(&start)?),
            Event::Empty(start) => {
                let node = element_from(&start)?;
                attach(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .context("Closing tag without a matching opening tag")?;
                attach(&mut stack, &mut root, node);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        bail!("Unexpected end of document inside <{}>", open.name);
    }

    root.context("Document contains no root element")
}

/// Reads and parses an XML file.
pub fn read_xml_tree(path: &Path) -> Result<XmlNode> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read XML file: {}", path.display()))?;

    parse_xml_tree(&content)
        .with_context(|| format!("Failed to parse XML file: {}", path.display()))
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlNode> {
    let mut node = XmlNode::new(String::from_utf8_lossy(start.name().as_ref()));

    for attr in start.attributes() {
        let attr = attr.context("Malformed attribute")?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .with_context(|| format!("Invalid escape in attribute '{key}'"))?
            .into_owned();
        node.attributes.push((key, value));
    }

    Ok(node)
}

/// Attaches a finished element to its parent, or makes it the root.
/// Only the first top-level element is kept.
fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_none() {
        *root = Some(node);
    }
}
