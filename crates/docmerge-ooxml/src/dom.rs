//! Minimal mutable XML tree for part editing
//!
//! The structural operations need to parse a whole XML part, replace or
//! append nodes, and serialize the result back. This module provides a
//! small owned tree over quick-xml events. Text and attribute values are
//! kept in their raw escaped source form and written back verbatim, so a
//! parse/serialize round trip does not rewrite character data; unescaping
//! happens only when computing text content for placeholder matching.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, TemplateError};

/// Namespace bound to the `w` prefix in wordprocessing documents
pub const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A node in the tree
#[derive(Debug, Clone)]
pub enum XmlNode {
    Element(XmlElement),
    /// Character data in raw escaped form
    Text(String),
    Comment(String),
    CData(String),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// An element with its raw prefixed name, attributes and children
#[derive(Debug, Clone)]
pub struct XmlElement {
    /// Raw element name including any namespace prefix, e.g. `w:p`
    pub name: String,
    /// Attributes in source order; values in raw escaped form
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

/// Path of child indices leading from an element to a descendant node
pub type NodePath = Vec<usize>;

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Element name without its namespace prefix: `w:p` -> `p`
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// Child elements in order, skipping text and other nodes
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Concatenated descendant character data, unescaped
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(raw) => out.push_str(&unescape_xml(raw)),
                XmlNode::CData(raw) => out.push_str(raw),
                XmlNode::Element(el) => el.collect_text(out),
                XmlNode::Comment(_) => {}
            }
        }
    }

    /// Depth-first search for the first descendant element satisfying
    /// `pred`, in document order. Returns the path of child indices from
    /// `self`, or None.
    pub fn find_descendant_path<F>(&self, pred: &F) -> Option<NodePath>
    where
        F: Fn(&XmlElement) -> bool,
    {
        for (i, node) in self.children.iter().enumerate() {
            if let XmlNode::Element(el) = node {
                if pred(el) {
                    return Some(vec![i]);
                }
                if let Some(mut rest) = el.find_descendant_path(pred) {
                    let mut path = vec![i];
                    path.append(&mut rest);
                    return Some(path);
                }
            }
        }
        None
    }

    /// Element at the given path, if the path leads to one
    pub fn element_at_path(&self, path: &[usize]) -> Option<&XmlElement> {
        match path {
            [] => Some(self),
            [i, rest @ ..] => match self.children.get(*i)? {
                XmlNode::Element(el) => el.element_at_path(rest),
                _ => None,
            },
        }
    }

    /// Replace the node at the given path. Returns false if the path does
    /// not lead to an existing node.
    pub fn replace_at_path(&mut self, path: &[usize], node: XmlNode) -> bool {
        match path {
            [] => false,
            [i] => match self.children.get_mut(*i) {
                Some(slot) => {
                    *slot = node;
                    true
                }
                None => false,
            },
            [i, rest @ ..] => match self.children.get_mut(*i) {
                Some(XmlNode::Element(el)) => el.replace_at_path(rest, node),
                _ => false,
            },
        }
    }
}

/// A parsed XML part: the declaration (kept verbatim) and the root element
#[derive(Debug, Clone)]
pub struct XmlTree {
    decl: Option<String>,
    pub root: XmlElement,
}

impl XmlTree {
    /// Parse an XML part into a tree
    pub fn parse(xml: &str) -> Result<XmlTree> {
        // The declaration is carried over verbatim rather than rebuilt
        let decl = xml
            .trim_start()
            .starts_with("<?xml")
            .then(|| {
                let trimmed = xml.trim_start();
                trimmed.find("?>").map(|end| trimmed[..end + 2].to_string())
            })
            .flatten();

        let mut reader = Reader::from_reader(xml.as_bytes());
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    stack.push(element_from_start(e)?);
                }
                Event::Empty(ref e) => {
                    let element = element_from_start(e)?;
                    attach(&mut stack, &mut root, XmlNode::Element(element))?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        TemplateError::InvalidStructure("unexpected closing tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, XmlNode::Element(element))?;
                }
                Event::Text(ref e) => {
                    let raw = std::str::from_utf8(e)?;
                    if let Some(parent) = stack.last_mut() {
                        push_text(parent, raw);
                    } else if !raw.trim().is_empty() {
                        return Err(TemplateError::InvalidStructure(
                            "character data outside the root element".to_string(),
                        ));
                    }
                }
                Event::GeneralRef(ref e) => {
                    // Entity reference; reconstitute its raw `&name;` form
                    let name = std::str::from_utf8(e)?;
                    if let Some(parent) = stack.last_mut() {
                        push_text(parent, &format!("&{name};"));
                    }
                }
                Event::CData(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        parent
                            .children
                            .push(XmlNode::CData(std::str::from_utf8(e)?.to_string()));
                    }
                }
                Event::Comment(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        parent
                            .children
                            .push(XmlNode::Comment(std::str::from_utf8(e)?.to_string()));
                    }
                }
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(TemplateError::InvalidStructure(
                "unclosed element at end of input".to_string(),
            ));
        }
        let root = root.ok_or_else(|| {
            TemplateError::InvalidStructure("document has no root element".to_string())
        })?;

        Ok(XmlTree { decl, root })
    }

    /// Serialize the tree back to XML text
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        if let Some(decl) = &self.decl {
            out.push_str(decl);
        }
        write_element(&mut out, &self.root);
        out
    }
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(std::str::from_utf8(e.name().as_ref())?);
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = std::str::from_utf8(&attr.value)?.to_string();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    node: XmlNode,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if let XmlNode::Element(el) = node {
        if root.is_some() {
            return Err(TemplateError::InvalidStructure(
                "multiple root elements".to_string(),
            ));
        }
        *root = Some(el);
    }
    Ok(())
}

// Adjacent raw runs are merged so entity references split by the reader
// rejoin their surrounding text.
fn push_text(parent: &mut XmlElement, raw: &str) {
    if let Some(XmlNode::Text(last)) = parent.children.last_mut() {
        last.push_str(raw);
    } else {
        parent.children.push(XmlNode::Text(raw.to_string()));
    }
}

fn write_element(out: &mut String, el: &XmlElement) {
    out.push('<');
    out.push_str(&el.name);
    for (key, value) in &el.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        // Raw values are already escaped; a literal quote can only come
        // from a single-quoted source attribute
        if value.contains('"') {
            out.push_str(&value.replace('"', "&quot;"));
        } else {
            out.push_str(value);
        }
        out.push('"');
    }
    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &el.children {
        match child {
            XmlNode::Element(e) => write_element(out, e),
            XmlNode::Text(raw) => out.push_str(raw),
            XmlNode::CData(raw) => {
                out.push_str("<![CDATA[");
                out.push_str(raw);
                out.push_str("]]>");
            }
            XmlNode::Comment(raw) => {
                out.push_str("<!--");
                out.push_str(raw);
                out.push_str("-->");
            }
        }
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

/// Decode the predefined character entities; anything else is left as-is
fn unescape_xml(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
