//! Readers for external file formats.
//!
//! Only generic XML tree reading lives here; the keylayout model is built from
//! the tree in [`crate::models::layout`].

pub mod xml_tree;

pub use xml_tree::{parse_xml_tree, read_xml_tree, XmlNode};
