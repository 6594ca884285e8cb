//! Document-body editing: paragraph splicing and tail insertion
//!
//! Both operations work on the serialized `word/document.xml` part and
//! return the updated text, leaving the caller to commit it. The splicer
//! goes through the tree in [`crate::dom`]; the tail inserter is a plain
//! byte-pattern splice and never parses the part.

use crate::dom::{XmlElement, XmlNode, XmlTree, WORDML_NS};
use crate::error::{Result, TemplateError};

/// Opening of a section-properties tag, with or without attributes
const SECTION_PROPS_OPEN: &str = "<w:sectPr";

/// Remove every line-break character; fragments are spliced into an
/// inline context where line breaks are not permitted
pub(crate) fn strip_line_breaks(fragment: &str) -> String {
    fragment.replace(['\r', '\n'], "")
}

/// Parse a caller-supplied fragment inside a throwaway wrapper root that
/// binds the `w` prefix, and return its top-level elements in order.
///
/// Accepts both bare sibling fragments (`<w:p>..</w:p><w:p>..</w:p>`) and
/// complete single-root documents.
pub(crate) fn parse_fragment(fragment: &str) -> Result<Vec<XmlElement>> {
    let wrapped = format!("<w:fragment xmlns:w=\"{WORDML_NS}\">{fragment}</w:fragment>");
    let tree = XmlTree::parse(&wrapped)
        .map_err(|e| TemplateError::MalformedFragment(e.to_string()))?;
    Ok(tree
        .root
        .children
        .into_iter()
        .filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
        .collect())
}

/// Replace the first paragraph whose descendant text contains `token`
/// with the fragment's first element.
///
/// Matching is by substring containment over the paragraph's concatenated
/// descendant text, in document order; only that first paragraph is
/// replaced. Returns `Ok(None)` without mutation when the document has no
/// body element or no paragraph matches.
pub(crate) fn splice_paragraph(
    document_xml: &str,
    token: &str,
    fragment: &str,
) -> Result<Option<String>> {
    let replacement = parse_fragment(&strip_line_breaks(fragment))?
        .into_iter()
        .next()
        .ok_or_else(|| {
            TemplateError::MalformedFragment("fragment contains no element".to_string())
        })?;

    let mut tree = XmlTree::parse(document_xml)?;

    let Some(body_path) = tree
        .root
        .find_descendant_path(&|el| el.local_name() == "body")
    else {
        return Ok(None);
    };
    let Some(body) = tree.root.element_at_path(&body_path) else {
        return Ok(None);
    };
    let Some(paragraph_path) = body.find_descendant_path(&|el| {
        el.local_name() == "p" && el.text_content().contains(token)
    }) else {
        return Ok(None);
    };

    let mut full_path = body_path;
    full_path.extend(paragraph_path);
    if !tree
        .root
        .replace_at_path(&full_path, XmlNode::Element(replacement))
    {
        return Ok(None);
    }

    Ok(Some(tree.to_xml()))
}

/// Insert a fragment immediately before the document's trailing
/// section-properties block.
///
/// The document-level `<w:sectPr>` is the last one in the part, so the
/// insertion point is the final occurrence of its opening tag. Returns
/// None without mutation when the part has no section-properties block.
pub(crate) fn insert_before_section_props(document_xml: &str, fragment: &str) -> Option<String> {
    let at = find_section_props_open(document_xml)?;
    let mut out = String::with_capacity(document_xml.len() + fragment.len());
    out.push_str(&document_xml[..at]);
    out.push_str(&strip_line_breaks(fragment));
    out.push_str(&document_xml[at..]);
    Some(out)
}

/// Byte offset of the last `<w:sectPr` opening tag, tolerating attributes
/// and rejecting longer names such as `<w:sectPrChange`
fn find_section_props_open(xml: &str) -> Option<usize> {
    let mut found = None;
    let mut from = 0;
    while let Some(rel) = xml[from..].find(SECTION_PROPS_OPEN) {
        let at = from + rel;
        let tail = &xml[at + SECTION_PROPS_OPEN.len()..];
        if matches!(tail.bytes().next(), Some(b'>' | b' ' | b'/' | b'\t' | b'\r' | b'\n')) {
            found = Some(at);
        }
        from = at + SECTION_PROPS_OPEN.len();
    }
    found
}
